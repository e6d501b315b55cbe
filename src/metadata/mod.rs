//! Page metadata records.
//!
//! A [`MetadataRecord`] is the structured summary of one fetched page:
//! title, description, icon, preview image and canonical URL. Records are
//! built once per URL by [`fetch_metadata`] (or degraded by the batch
//! resolver when that fails) and never mutated afterwards.
//!
//! # Example
//!
//! ```rust
//! use metalinks::metadata::parse_metadata;
//!
//! let html = r#"<html><head>
//!     <title>Example Domain</title>
//!     <meta name="description" content="An example page">
//! </head></html>"#;
//! let record = parse_metadata(html, "https://example.com").unwrap();
//! assert_eq!(record.title.as_deref(), Some("Example Domain"));
//! assert_eq!(record.url, "https://example.com");
//! ```

pub mod parse;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http_client::PageFetcher;

pub use parse::parse_metadata;

/// Structured summary of a fetched web page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Favicon URL. Never falls back to the preview image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Preview image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Canonical URL, or the requested URL when the page declares none.
    pub url: String,
}

impl MetadataRecord {
    /// A record with every optional field absent, tagged with `url`.
    pub fn degraded(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// True when no metadata beyond the URL is known.
    pub fn is_degraded(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.icon.is_none()
            && self.image.is_none()
    }
}

/// Fetch `url` and parse its page into a [`MetadataRecord`].
///
/// Fetch and parse failures are returned, not swallowed; the batch
/// resolver is where they get degraded.
pub async fn fetch_metadata(fetcher: &dyn PageFetcher, url: &str) -> Result<MetadataRecord> {
    let body = fetcher.fetch_text(url).await?;
    parse_metadata(&body, url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinkError;
    use async_trait::async_trait;

    struct StaticFetcher(&'static str);

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch_text(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            Err(LinkError::Fetch {
                url: url.to_string(),
                reason: "connection reset".into(),
            })
        }
    }

    #[test]
    fn degraded_record_keeps_url() {
        let record = MetadataRecord::degraded("https://bad.example");
        assert_eq!(record.url, "https://bad.example");
        assert!(record.is_degraded());
    }

    #[test]
    fn serializes_camel_case_and_skips_absent() {
        let record = MetadataRecord {
            title: Some("Title".into()),
            ..MetadataRecord::degraded("https://example.com")
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"title":"Title","url":"https://example.com"}"#);
    }

    #[tokio::test]
    async fn fetch_metadata_parses_fetched_body() {
        let fetcher = StaticFetcher("<html><head><title>Fetched</title></head></html>");
        let record = fetch_metadata(&fetcher, "https://example.com").await.unwrap();
        assert_eq!(record.title.as_deref(), Some("Fetched"));
        assert_eq!(record.url, "https://example.com");
    }

    #[tokio::test]
    async fn fetch_metadata_propagates_fetch_error() {
        let err = fetch_metadata(&FailingFetcher, "https://bad.example")
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::Fetch { .. }));
    }
}
