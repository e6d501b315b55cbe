//! Styled link-card rendering.
//!
//! Each card is a single line of inline-styled markup so it survives
//! editors that treat blank lines as block boundaries. Colours come from
//! the host theme's CSS variables.

use super::{escape_html, normalize_whitespace, RenderMode, Renderer};
use crate::metadata::MetadataRecord;

const WRAPPER_STYLE: &str = "position: relative;";
const LINK_STYLE: &str = "border: 1px solid var(--background-modifier-border); margin: 20px 0; \
    border-radius: 3px; width: 100%; display: flex; text-decoration: none !important; \
    background-color: var(--background-primary);";
const IMAGE_FRAME_STYLE: &str = "height: 100%; width: 35%; min-width: 120px; overflow: hidden; \
    border-right: 1px solid var(--background-modifier-border);";
const IMAGE_STYLE: &str = "background-position: center center; background-size: cover; \
    background-repeat: no-repeat; padding-bottom: 120px; \
    background-color: var(--background-secondary);";
const BODY_STYLE: &str = "padding: 8px; width: 75%; overflow: hidden;";
const TITLE_STYLE: &str = "font-family: sans-serif; font-size: 1.125rem; margin: 0 0 4px 0; \
    display: -webkit-box; -webkit-line-clamp: 1; -webkit-box-orient: vertical; \
    overflow: hidden; color: var(--text-normal);";
const DESCRIPTION_STYLE: &str = "font-family: sans-serif; font-size: 1rem; margin: 0; \
    color: var(--text-muted); display: -webkit-box; -webkit-line-clamp: 2; \
    -webkit-box-orient: vertical; overflow: hidden;";
const CAPTION_STYLE: &str = "font-family: sans-serif; font-size: 1rem; margin: 0; \
    color: var(--text-faint); display: -webkit-box; -webkit-line-clamp: 1; \
    -webkit-box-orient: vertical; overflow: hidden;";

/// Renders each record as a link card: image on the left, one-line title,
/// two-line description and a URL caption on the right.
pub struct CardRenderer {
    escape: bool,
}

impl CardRenderer {
    pub fn new(escape: bool) -> Self {
        Self { escape }
    }

    /// Escaped text, with brackets encoded so link syntax in scraped
    /// content is inert.
    fn text(&self, value: &str) -> String {
        if self.escape {
            escape_html(value).replace('[', "&#91;").replace(']', "&#93;")
        } else {
            value.to_string()
        }
    }
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Renderer for CardRenderer {
    fn mode(&self) -> RenderMode {
        RenderMode::Html
    }

    fn render_record(&self, record: &MetadataRecord) -> String {
        let url = self.text(&record.url);
        let title = self.text(&normalize_whitespace(record.title.as_deref().unwrap_or_default()));
        let description =
            self.text(&normalize_whitespace(record.description.as_deref().unwrap_or_default()));

        // Without an image the secondary background colour shows through
        let image_style = match record.image.as_deref() {
            Some(image) => format!(
                "background-image: url('{}'); {IMAGE_STYLE}",
                self.text(&css_string(image))
            ),
            None => IMAGE_STYLE.to_string(),
        };

        format!(
            "<div style=\"{WRAPPER_STYLE}\">\
             <a href=\"{url}\" target=\"_blank\" style=\"{LINK_STYLE}\">\
             <div style=\"{IMAGE_FRAME_STYLE}\">\
             <div loading=\"lazy\" style=\"{image_style}\"></div>\
             </div>\
             <div style=\"{BODY_STYLE}\">\
             <h5 style=\"{TITLE_STYLE}\">{title}</h5>\
             <p style=\"{DESCRIPTION_STYLE}\">{description}</p>\
             <p style=\"{CAPTION_STYLE}\">{url}</p>\
             </div>\
             </a>\
             </div>"
        )
    }
}

/// Escape `value` for a single-quoted CSS string.
fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' | '\'' | '"' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' | '\r' | '\t' => out.push_str(&format!("\\{:x} ", u32::from(ch))),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> MetadataRecord {
        MetadataRecord {
            title: Some("Example Domain".into()),
            description: Some("Illustrative examples".into()),
            icon: Some("https://example.com/favicon.ico".into()),
            image: Some("https://example.com/og.png".into()),
            url: "https://example.com".into(),
        }
    }

    #[test]
    fn card_contains_every_region() {
        let card = CardRenderer::default().render_record(&full_record());
        assert!(card.starts_with("<div style=\"position: relative;\">"));
        assert!(card.contains("<a href=\"https://example.com\" target=\"_blank\""));
        assert!(card.contains("background-image: url('https://example.com/og.png');"));
        assert!(card.contains("loading=\"lazy\""));
        assert!(card.contains(">Example Domain</h5>"));
        assert!(card.contains(">Illustrative examples</p>"));
        assert!(card.contains(">https://example.com</p>"));
        assert!(card.contains("-webkit-line-clamp: 2"));
        assert!(card.ends_with("</a></div>"));
        assert!(!card.contains('\n'));
    }

    #[test]
    fn collapses_scraped_whitespace() {
        let record = MetadataRecord {
            title: Some("A\n\n\n\nB".into()),
            description: Some("\n\n\n   line one      line two   ".into()),
            ..MetadataRecord::degraded("https://example.com")
        };
        let card = CardRenderer::default().render_record(&record);
        assert!(card.contains(">A B</h5>"));
        assert!(card.contains(">line one line two</p>"));
    }

    #[test]
    fn missing_image_leaves_background_only() {
        let card = CardRenderer::default().render_record(&MetadataRecord::degraded("https://bad.example"));
        assert!(!card.contains("background-image"));
        assert!(card.contains("background-color: var(--background-secondary)"));
        assert!(card.contains("<h5 style=\""));
        assert!(!card.contains("undefined"));
    }

    #[test]
    fn escapes_text_by_default() {
        let record = MetadataRecord {
            title: Some("<script>alert(1)</script>".into()),
            description: Some("Fish & \"Chips\"".into()),
            ..MetadataRecord::degraded("https://example.com/?a=1&b=2")
        };
        let card = CardRenderer::default().render_record(&record);
        assert!(card.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(card.contains("Fish &amp; &quot;Chips&quot;"));
        assert!(card.contains("href=\"https://example.com/?a=1&amp;b=2\""));
        assert!(!card.contains("<script>"));
    }

    #[test]
    fn escaping_can_be_disabled() {
        let record = MetadataRecord {
            title: Some("<b>Bold</b>".into()),
            ..MetadataRecord::degraded("https://example.com")
        };
        let card = CardRenderer::new(false).render_record(&record);
        assert!(card.contains("><b>Bold</b></h5>"));
    }

    #[test]
    fn brackets_in_text_are_encoded() {
        let record = MetadataRecord {
            title: Some("Rust [docs](https://doc.rust-lang.org)".into()),
            ..MetadataRecord::degraded("https://a.com")
        };
        let card = CardRenderer::default().render_record(&record);
        assert!(card.contains(">Rust &#91;docs&#93;(https://doc.rust-lang.org)</h5>"));
        assert!(!card.contains('['));
    }

    #[test]
    fn image_url_is_a_quoted_css_string() {
        let record = MetadataRecord {
            image: Some("https://example.com/it's (1).png".into()),
            ..MetadataRecord::degraded("https://example.com")
        };
        let card = CardRenderer::new(false).render_record(&record);
        assert!(card.contains(r"background-image: url('https://example.com/it\'s (1).png');"));

        let escaped = CardRenderer::default().render_record(&record);
        assert!(escaped.contains(r"url('https://example.com/it\&#39;s (1).png');"));
    }

    #[test]
    fn css_string_escapes_breaking_characters() {
        assert_eq!(css_string("a'b\"c\\d"), r#"a\'b\"c\\d"#);
        assert_eq!(css_string("a\nb"), r"a\a b");
    }
}
