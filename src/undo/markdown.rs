//! `[title](url)` links, as written by the plain renderer.

use once_cell::sync::Lazy;
use regex::Regex;

use super::UrlStrategy;

/// `[text](dest)` on one line. Link text may hold backslash escapes;
/// the destination is either `<url>` or a bare URL whose parentheses nest.
static MARKDOWN_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\[(?:\\.|[^\]\\\n])*\]\(\s*(?:<(https?://[^>\s]+)>|(https?://(?:[^\s()]|\([^\s()]*\))+))\s*\)",
    )
    .unwrap()
});

/// Whole `<a ...>...</a>` spans, i.e. rendered cards. Backslash-escaped
/// tags are plain text and stay.
static ANCHOR_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(^|[^\\])<a\s[^>]*>.*?</a>").unwrap());

/// Recovers the destination of every `[...](URL)` construct outside
/// anchor elements.
pub struct MarkdownLinkStrategy;

impl UrlStrategy for MarkdownLinkStrategy {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn detects(&self, text: &str) -> bool {
        text.contains('[')
    }

    fn extract(&self, text: &str) -> Vec<String> {
        let outside_cards = ANCHOR_SPAN_RE.replace_all(text, "${1}\n");
        MARKDOWN_LINK_RE
            .captures_iter(&outside_cards)
            .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
