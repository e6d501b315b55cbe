//! HTML page → [`MetadataRecord`].
//!
//! Lookup order per field:
//!
//! | Field | Sources, first hit wins |
//! |-------|-------------------------|
//! | title | `og:title`, `twitter:title`, `<title>` |
//! | description | `og:description`, `twitter:description`, `<meta name="description">` |
//! | icon | `<link rel="icon">` (incl. `shortcut icon`), `apple-touch-icon` |
//! | image | `og:image*`, `twitter:image`, `<link rel="image_src">`, first `<img src>` |
//! | url | `og:url`, `<link rel="canonical">`, requested URL |
//!
//! Relative references are resolved against the requested URL.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::MetadataRecord;
use crate::error::{LinkError, Result};

static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[content]").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("link[rel][href]").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());

const TITLE_KEYS: &[&str] = &["og:title", "twitter:title"];
const DESCRIPTION_KEYS: &[&str] = &["og:description", "twitter:description", "description"];
const IMAGE_KEYS: &[&str] = &[
    "og:image",
    "og:image:url",
    "og:image:secure_url",
    "twitter:image",
    "twitter:image:src",
];

/// Parse a page body into a [`MetadataRecord`] for `url`.
///
/// Returns [`LinkError::Parse`] when the body has no content at all.
/// Any field missing from the page is simply absent; `url` is always set.
pub fn parse_metadata(html: &str, url: &str) -> Result<MetadataRecord> {
    if html.trim().is_empty() {
        return Err(LinkError::Parse {
            url: url.to_string(),
            reason: "empty document".into(),
        });
    }

    let document = Html::parse_document(html);
    let base = Url::parse(url).ok();

    let title = meta_content(&document, TITLE_KEYS).or_else(|| title_text(&document));
    let description = meta_content(&document, DESCRIPTION_KEYS);

    let icon = link_href(&document, |rel| rel.iter().any(|r| r == "icon"))
        .or_else(|| link_href(&document, |rel| rel.iter().any(|r| r == "apple-touch-icon")))
        .and_then(|href| resolve(base.as_ref(), &href));

    let image = meta_content(&document, IMAGE_KEYS)
        .or_else(|| link_href(&document, |rel| rel.iter().any(|r| r == "image_src")))
        .and_then(|src| resolve(base.as_ref(), &src))
        .or_else(|| first_image(&document, base.as_ref()));

    let canonical = meta_content(&document, &["og:url"])
        .or_else(|| link_href(&document, |rel| rel.iter().any(|r| r == "canonical")))
        .and_then(|href| resolve(base.as_ref(), &href));

    Ok(MetadataRecord {
        title,
        description,
        icon,
        image,
        url: canonical.unwrap_or_else(|| url.to_string()),
    })
}

/// First non-empty `content` of a `<meta>` whose `property` or `name`
/// matches one of `keys`, trying keys in order.
fn meta_content(document: &Html, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        document.select(&META).find_map(|el| {
            let attrs = el.value();
            let named = [attrs.attr("property"), attrs.attr("name")]
                .into_iter()
                .flatten()
                .any(|k| k.trim().eq_ignore_ascii_case(key));
            if named {
                non_empty(attrs.attr("content"))
            } else {
                None
            }
        })
    })
}

/// `href` of the first `<link>` whose lowercased `rel` tokens satisfy `want`.
fn link_href(document: &Html, want: impl Fn(&[String]) -> bool) -> Option<String> {
    document.select(&LINK).find_map(|el| {
        let rel: Vec<String> = el
            .value()
            .attr("rel")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();
        if want(&rel) {
            non_empty(el.value().attr("href"))
        } else {
            None
        }
    })
}

fn title_text(document: &Html) -> Option<String> {
    document
        .select(&TITLE)
        .next()
        .map(|el: ElementRef<'_>| el.text().collect::<String>())
        .and_then(|t| non_empty(Some(t.as_str())))
}

/// First `<img>` that resolves to an http(s) URL; data URIs are skipped.
fn first_image(document: &Html, base: Option<&Url>) -> Option<String> {
    document
        .select(&IMG)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .find_map(|src| resolve(base, src))
}

/// Resolve `reference` against `base`, keeping only http(s) results.
fn resolve(base: Option<&Url>, reference: &str) -> Option<String> {
    let reference = reference.trim();
    let resolved = match base {
        Some(base) => base.join(reference).ok()?,
        None => Url::parse(reference).ok()?,
    };
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
