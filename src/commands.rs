//! The two user-facing operations: convert a selection forward into
//! metadata links, and undo rendered links back into bare URLs.
//!
//! Neither operation returns an error to the host. Every outcome is
//! reported through the [`Notifier`] and summarised in the returned report.

use std::sync::Arc;

use tracing::{error, info};

use crate::editor::{Editor, Notifier};
use crate::error::{LinkError, Result};
use crate::extract::extract_urls;
use crate::http_client::PageFetcher;
use crate::render::render;
use crate::resolve::BatchResolver;
use crate::settings::Settings;
use crate::undo::{join_urls, ReverseExtractor};

pub const SELECT_URL_NOTICE: &str = "Select a URL to convert";
pub const SELECT_LINK_NOTICE: &str = "Select a metadata link to convert";
pub const CONVERTED_NOTICE: &str = "Converted URLs to metadata links";
pub const CONVERT_ERROR_NOTICE: &str = "Error converting URLs to metadata links";
pub const UNDONE_NOTICE: &str = "Converted metadata links to URLs";
pub const NOTHING_TO_UNDO_NOTICE: &str = "No metadata links found in selection";
pub const SUPERSEDED_NOTICE: &str = "Selection changed by a newer conversion; result discarded";

/// What a convert invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertReport {
    /// Nothing was selected; the editor was not touched.
    NoSelection,
    /// The selection was rewritten.
    Converted {
        found: usize,
        resolved: usize,
        failed: usize,
    },
    /// A newer operation started on the same editor first.
    Superseded,
    /// Resolution failed as a whole; the editor was not touched.
    Failed,
}

/// What an undo invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoReport {
    NoSelection,
    /// The selection was replaced by `urls` recovered URLs (possibly zero).
    Restored { urls: usize },
    /// No links recognised and settings forbid an empty replacement.
    NothingToUndo,
}

/// Entry points bound to host triggers (icon, command palette, CLI).
pub struct MetadataLinks {
    resolver: BatchResolver,
    extractor: ReverseExtractor,
}

impl MetadataLinks {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_extractor(fetcher, ReverseExtractor::new())
    }

    pub fn with_extractor(fetcher: Arc<dyn PageFetcher>, extractor: ReverseExtractor) -> Self {
        Self {
            resolver: BatchResolver::new(fetcher),
            extractor,
        }
    }

    /// Convert the URLs in the selection into metadata links.
    ///
    /// Appends the rendered block below the selection, or replaces the
    /// selection when `settings.replace_on_render` is set.
    pub async fn convert_selection(
        &self,
        editor: &dyn Editor,
        notifier: &dyn Notifier,
        settings: &Settings,
    ) -> ConvertReport {
        let Ok(text) = selected_text(editor).await else {
            notifier.notice(SELECT_URL_NOTICE);
            return ConvertReport::NoSelection;
        };
        let token = editor.operations().begin();

        let urls = extract_urls(&text);
        let outcome = match self.resolver.resolve_all(&urls).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Conversion aborted: {}", e);
                notifier.notice(CONVERT_ERROR_NOTICE);
                return ConvertReport::Failed;
            }
        };

        notifier.notice(&format!("Found {} metadata links", outcome.records.len()));
        if outcome.failed > 0 {
            notifier.notice(&format!(
                "{} of {} links could not be resolved",
                outcome.failed,
                outcome.records.len()
            ));
        }

        let rendered = render(&outcome.records, settings.render, &settings.render_options()).join("\n");
        let content = if settings.replace_on_render {
            rendered
        } else {
            format!("{text}\n\n{rendered}")
        };

        if !token.is_current() {
            info!("Discarding stale conversion result");
            notifier.notice(SUPERSEDED_NOTICE);
            return ConvertReport::Superseded;
        }

        editor.replace_selection(content).await;
        notifier.notice(CONVERTED_NOTICE);

        ConvertReport::Converted {
            found: urls.len(),
            resolved: outcome.resolved,
            failed: outcome.failed,
        }
    }

    /// Replace rendered links in the selection with their bare URLs.
    ///
    /// With nothing recognised the selection is replaced by empty text,
    /// unless `settings.undo_requires_match` is set.
    pub async fn undo_selection(
        &self,
        editor: &dyn Editor,
        notifier: &dyn Notifier,
        settings: &Settings,
    ) -> UndoReport {
        let Ok(text) = selected_text(editor).await else {
            notifier.notice(SELECT_LINK_NOTICE);
            return UndoReport::NoSelection;
        };
        // Supersedes any conversion still in flight on this editor
        let _token = editor.operations().begin();

        let urls = self.extractor.extract_original_urls(&text);
        if urls.is_empty() && settings.undo_requires_match {
            notifier.notice(NOTHING_TO_UNDO_NOTICE);
            return UndoReport::NothingToUndo;
        }

        editor.replace_selection(join_urls(&urls)).await;
        notifier.notice(UNDONE_NOTICE);

        UndoReport::Restored { urls: urls.len() }
    }
}

async fn selected_text(editor: &dyn Editor) -> Result<String> {
    editor
        .selection()
        .await
        .filter(|text| !text.is_empty())
        .ok_or(LinkError::NoSelection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{RecordingNotifier, TextBuffer};
    use crate::render::RenderMode;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Every page titled after its host; `broken.test` fails. The first
    /// `slow_calls` fetches sleep, later ones return immediately.
    struct HostTitleFetcher {
        calls: AtomicUsize,
        slow_calls: usize,
    }

    impl HostTitleFetcher {
        fn new() -> Self {
            Self::slow_first(0)
        }

        fn slow_first(slow_calls: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                slow_calls,
            }
        }
    }

    #[async_trait]
    impl PageFetcher for HostTitleFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.slow_calls {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            if url.contains("broken.test") {
                return Err(LinkError::Fetch {
                    url: url.to_string(),
                    reason: "connection refused".into(),
                });
            }
            let host = url.split("://").nth(1).unwrap_or(url);
            Ok(format!(
                "<html><head><title>{host}</title><meta name=\"description\" content=\"About {host}\"></head></html>"
            ))
        }
    }

    struct PanickingFetcher;

    #[async_trait]
    impl PageFetcher for PanickingFetcher {
        async fn fetch_text(&self, _url: &str) -> Result<String> {
            panic!("resolver bug");
        }
    }

    fn links() -> MetadataLinks {
        MetadataLinks::new(Arc::new(HostTitleFetcher::new()))
    }

    fn markdown_settings() -> Settings {
        Settings {
            render: RenderMode::Markdown,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn empty_selection_is_a_noop_with_notice() {
        let buffer = TextBuffer::empty();
        let notifier = RecordingNotifier::new();

        let report = links()
            .convert_selection(&buffer, &notifier, &Settings::default())
            .await;

        assert_eq!(report, ConvertReport::NoSelection);
        assert_eq!(buffer.replacements().await, 0);
        assert_eq!(notifier.notices(), vec![SELECT_URL_NOTICE]);
    }

    #[tokio::test]
    async fn appends_rendered_links_below_selection() {
        let text = "check https://example.com and https://foo.org/page";
        let buffer = TextBuffer::new(text);
        let notifier = RecordingNotifier::new();

        let report = links()
            .convert_selection(&buffer, &notifier, &markdown_settings())
            .await;

        assert_eq!(
            report,
            ConvertReport::Converted {
                found: 2,
                resolved: 2,
                failed: 0
            }
        );
        assert_eq!(
            buffer.text().await,
            format!(
                "{text}\n\n- [example.com](https://example.com): About example.com\n\
                 - [foo.org/page](https://foo.org/page): About foo.org/page"
            )
        );
        assert_eq!(
            notifier.notices(),
            vec!["Found 2 metadata links", CONVERTED_NOTICE]
        );
    }

    #[tokio::test]
    async fn replace_mode_drops_original_text() {
        let buffer = TextBuffer::new("https://example.com");
        let settings = Settings {
            replace_on_render: true,
            ..Settings::default()
        };

        links()
            .convert_selection(&buffer, &RecordingNotifier::new(), &settings)
            .await;

        let text = buffer.text().await;
        assert!(text.starts_with("<div style="));
        assert!(text.contains("href=\"https://example.com\""));
        assert!(!text.starts_with("https://example.com"));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_its_line() {
        let buffer = TextBuffer::new("https://broken.test https://example.com");
        let notifier = RecordingNotifier::new();
        let settings = Settings {
            replace_on_render: true,
            ..markdown_settings()
        };

        let report = links().convert_selection(&buffer, &notifier, &settings).await;

        assert_eq!(
            report,
            ConvertReport::Converted {
                found: 2,
                resolved: 1,
                failed: 1
            }
        );
        assert_eq!(
            buffer.text().await,
            "- [](https://broken.test): \n- [example.com](https://example.com): About example.com"
        );
        assert!(notifier
            .notices()
            .contains(&"1 of 2 links could not be resolved".to_string()));
    }

    #[tokio::test]
    async fn batch_failure_leaves_selection_untouched() {
        let buffer = TextBuffer::new("https://example.com");
        let notifier = RecordingNotifier::new();
        let links = MetadataLinks::new(Arc::new(PanickingFetcher));

        let report = links
            .convert_selection(&buffer, &notifier, &Settings::default())
            .await;

        assert_eq!(report, ConvertReport::Failed);
        assert_eq!(buffer.replacements().await, 0);
        assert_eq!(buffer.text().await, "https://example.com");
        assert_eq!(notifier.notices(), vec![CONVERT_ERROR_NOTICE]);
    }

    #[tokio::test]
    async fn stale_conversion_is_discarded() {
        let buffer = TextBuffer::new("https://example.com");
        let notifier = RecordingNotifier::new();
        // First fetch is slow, so the second invocation finishes first
        let links = MetadataLinks::new(Arc::new(HostTitleFetcher::slow_first(1)));
        let settings = Settings {
            replace_on_render: true,
            ..markdown_settings()
        };

        let (first, second) = tokio::join!(
            links.convert_selection(&buffer, &notifier, &settings),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                links.convert_selection(&buffer, &notifier, &settings).await
            }
        );

        assert_eq!(first, ConvertReport::Superseded);
        assert!(matches!(second, ConvertReport::Converted { .. }));
        assert_eq!(buffer.replacements().await, 1);
        assert!(notifier.notices().contains(&SUPERSEDED_NOTICE.to_string()));
    }

    #[tokio::test]
    async fn undo_restores_urls_from_cards() {
        let buffer = TextBuffer::new("https://example.com https://foo.org/page");
        let notifier = RecordingNotifier::new();
        let links = links();
        let settings = Settings {
            replace_on_render: true,
            ..Settings::default()
        };

        links.convert_selection(&buffer, &notifier, &settings).await;
        let report = links.undo_selection(&buffer, &notifier, &settings).await;

        assert_eq!(report, UndoReport::Restored { urls: 2 });
        assert_eq!(buffer.text().await, "https://example.com\nhttps://foo.org/page");
        assert_eq!(notifier.notices().last().map(String::as_str), Some(UNDONE_NOTICE));
    }

    #[tokio::test]
    async fn undo_without_links_replaces_with_empty_text() {
        let buffer = TextBuffer::new("just prose");
        let report = links()
            .undo_selection(&buffer, &RecordingNotifier::new(), &Settings::default())
            .await;

        assert_eq!(report, UndoReport::Restored { urls: 0 });
        assert_eq!(buffer.replacements().await, 1);
        assert_eq!(buffer.text().await, "");
    }

    #[tokio::test]
    async fn undo_can_require_a_match() {
        let buffer = TextBuffer::new("just prose");
        let notifier = RecordingNotifier::new();
        let settings = Settings {
            undo_requires_match: true,
            ..Settings::default()
        };

        let report = links().undo_selection(&buffer, &notifier, &settings).await;

        assert_eq!(report, UndoReport::NothingToUndo);
        assert_eq!(buffer.replacements().await, 0);
        assert_eq!(notifier.notices(), vec![NOTHING_TO_UNDO_NOTICE]);
    }

    #[tokio::test]
    async fn undo_empty_selection_is_a_noop() {
        let buffer = TextBuffer::empty();
        let notifier = RecordingNotifier::new();
        let report = links()
            .undo_selection(&buffer, &notifier, &Settings::default())
            .await;

        assert_eq!(report, UndoReport::NoSelection);
        assert_eq!(buffer.replacements().await, 0);
        assert_eq!(notifier.notices(), vec![SELECT_LINK_NOTICE]);
    }
}
