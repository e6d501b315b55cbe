//! Metadata records → text fragments.
//!
//! Two representations, selected by [`RenderMode`]:
//!
//! | Mode | Renderer | Output per record |
//! |------|----------|-------------------|
//! | `markdown` | [`PlainRenderer`] | `- [title](url): description` |
//! | `html` | [`CardRenderer`] | self-contained styled link card |
//!
//! Output is always one fragment per record, in record order.
//!
//! # Example
//!
//! ```rust
//! use metalinks::metadata::MetadataRecord;
//! use metalinks::render::{render, RenderMode, RenderOptions};
//!
//! let records = vec![MetadataRecord {
//!     title: Some("Example".into()),
//!     ..MetadataRecord::degraded("https://example.com")
//! }];
//! let lines = render(&records, RenderMode::Markdown, &RenderOptions::default());
//! assert_eq!(lines, vec!["- [Example](https://example.com): "]);
//! ```

pub mod card;
pub mod plain;

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::metadata::MetadataRecord;

pub use card::CardRenderer;
pub use plain::PlainRenderer;

/// Output representation chosen by the user.
///
/// Settings files store this as free text; anything other than `"html"`
/// selects markdown, matching how older settings were written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RenderMode {
    /// Styled card markup.
    #[default]
    Html,
    /// Plain linked list.
    Markdown,
}

impl RenderMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }
}

impl From<String> for RenderMode {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("html") {
            Self::Html
        } else {
            Self::Markdown
        }
    }
}

impl From<RenderMode> for String {
    fn from(mode: RenderMode) -> Self {
        mode.as_str().to_string()
    }
}

impl FromStr for RenderMode {
    type Err = String;

    /// Strict parse for user input; unlike settings loading, unknown
    /// names are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "html" | "card" | "cards" => Ok(Self::Html),
            "markdown" | "md" | "plain" => Ok(Self::Markdown),
            other => Err(format!("unknown render mode '{other}' (expected html or markdown)")),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs shared by all renderers.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Escape `& < > " '` in card text and attributes.
    pub escape_html: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { escape_html: true }
    }
}

/// Turns one [`MetadataRecord`] into one text fragment.
pub trait Renderer: Send + Sync {
    /// Mode this renderer implements.
    fn mode(&self) -> RenderMode;

    /// Render a single record.
    fn render_record(&self, record: &MetadataRecord) -> String;
}

/// Renderer for `mode`.
pub fn renderer_for(mode: RenderMode, options: &RenderOptions) -> Box<dyn Renderer> {
    match mode {
        RenderMode::Html => Box::new(CardRenderer::new(options.escape_html)),
        RenderMode::Markdown => Box::new(PlainRenderer),
    }
}

/// Render every record with the renderer for `mode`, preserving order.
pub fn render(records: &[MetadataRecord], mode: RenderMode, options: &RenderOptions) -> Vec<String> {
    let renderer = renderer_for(mode, options);
    records.iter().map(|r| renderer.render_record(r)).collect()
}

static LONG_WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{3,}").unwrap());

/// Collapse runs of 3+ whitespace characters to one space, then trim.
///
/// Scraped titles often carry the page's indentation and line breaks.
pub fn normalize_whitespace(text: &str) -> String {
    LONG_WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Escape the characters that are significant in HTML text and
/// double- or single-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
