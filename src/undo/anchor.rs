//! `<a href="...">` cards, as written by the card renderer.

use once_cell::sync::Lazy;
use regex::Regex;

use super::UrlStrategy;

/// `href` of an opening `<a>` tag that is not backslash-escaped.
static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[^\\])<a\s[^>]*?href="(https?://[^"]+)""#).unwrap()
});

/// Recovers the `href` destination of every anchor.
///
/// Cards escape their attributes, so entities are decoded on the way out.
pub struct AnchorHrefStrategy;

impl UrlStrategy for AnchorHrefStrategy {
    fn name(&self) -> &'static str {
        "anchor"
    }

    fn detects(&self, text: &str) -> bool {
        text.contains("<a") && text.contains("href")
    }

    fn extract(&self, text: &str) -> Vec<String> {
        HREF_RE
            .captures_iter(text)
            .filter_map(|cap| cap.get(1))
            .map(|m| decode_entities(m.as_str()))
            .collect()
    }
}

/// Reverse of [`crate::render::escape_html`].
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#91;", "[")
        .replace("&#93;", "]")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_hrefs_in_order() {
        let text = r#"<div><a href="https://a.com" target="_blank">A</a></div>
<div><a href="http://b.org/path">B</a></div>"#;
        assert_eq!(AnchorHrefStrategy.extract(text), vec!["https://a.com", "http://b.org/path"]);
    }

    #[test]
    fn decodes_escaped_ampersands() {
        let text = r#"<a href="https://x.com/?a=1&amp;b=2">x</a>"#;
        assert_eq!(AnchorHrefStrategy.extract(text), vec!["https://x.com/?a=1&b=2"]);
    }

    #[test]
    fn decodes_encoded_brackets() {
        let text = r#"<a href="https://x.com/?ids&#91;&#93;=1&amp;q=&#39;a&#39;">x</a>"#;
        assert_eq!(AnchorHrefStrategy.extract(text), vec!["https://x.com/?ids[]=1&q='a'"]);
    }

    #[test]
    fn decode_handles_double_escaping_once() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn escaped_tags_are_ignored() {
        let text = r#"- [](https://a.com): \<a href="https://evil.com">x\</a>"#;
        assert!(AnchorHrefStrategy.extract(text).is_empty());
    }

    #[test]
    fn href_must_sit_in_an_anchor_tag() {
        let text = r#"<link href="https://style.css.com"><a target="_blank" href="https://a.com">a</a>"#;
        assert_eq!(AnchorHrefStrategy.extract(text), vec!["https://a.com"]);
    }

    #[test]
    fn needs_anchor_and_href() {
        assert!(AnchorHrefStrategy.detects(r#"<a href="https://a.com">"#));
        assert!(!AnchorHrefStrategy.detects("href alone"));
        assert!(!AnchorHrefStrategy.detects("<a name=\"top\">"));
    }
}
