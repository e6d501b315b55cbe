//! Plain linked-list rendering.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{RenderMode, Renderer};
use crate::metadata::MetadataRecord;

/// Renders `- [title](url): description`, one line per record.
///
/// Absent title or description render as empty text. Brackets, `<` and
/// backslashes in the text are backslash-escaped so scraped link or tag
/// syntax never reads as a second link. A URL with unbalanced parentheses is
/// written as an `<url>` destination.
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn mode(&self) -> RenderMode {
        RenderMode::Markdown
    }

    fn render_record(&self, record: &MetadataRecord) -> String {
        let title = escape_markdown(&single_line(record.title.as_deref().unwrap_or_default()));
        let description =
            escape_markdown(&single_line(record.description.as_deref().unwrap_or_default()));
        let url = destination(&record.url);
        format!("- [{title}]({url}): {description}")
    }
}

static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[\r\n]\s*").unwrap());

/// Fold line breaks (and the whitespace around them) into one space so a
/// record never spills onto a second list line.
fn single_line(text: &str) -> String {
    LINE_BREAK_RE.replace_all(text, " ").trim().to_string()
}

fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '[' | ']' | '<') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Link destination for `url`: bare when its parentheses nest cleanly,
/// angle-bracketed otherwise.
fn destination(url: &str) -> String {
    let mut depth = 0usize;
    for ch in url.chars() {
        match ch {
            '(' => depth += 1,
            ')' if depth == 0 => return format!("<{url}>"),
            ')' => depth -= 1,
            _ => {}
        }
    }
    if depth == 0 {
        url.to_string()
    } else {
        format!("<{url}>")
    }
}
