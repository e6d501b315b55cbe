//! URL extraction from free text.
//!
//! Scans for whitespace-delimited runs starting with `http://` or `https://`
//! and keeps the ones that pass a permissive syntactic check. Nothing is
//! fetched or resolved here.
//!
//! # Example
//!
//! ```rust
//! use metalinks::extract::extract_urls;
//!
//! let urls = extract_urls("check https://example.com and https://foo.org/page");
//! assert_eq!(urls, vec!["https://example.com", "https://foo.org/page"]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

/// Candidate runs: scheme followed by anything up to the next whitespace.
static CANDIDATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

/// Scheme-optional `host.tld` with optional path, query and fragment.
/// Character classes are ASCII only.
static VALID_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(https?://)?([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,6}(/[A-Za-z0-9_ .-]*)*(\?[A-Za-z0-9_=&%.-]*)?(#[A-Za-z0-9_-]*)?$",
    )
    .unwrap()
});

/// Returns `true` if `url` passes the syntactic URL check.
///
/// The host must be one or more dot-separated labels followed by a 2-6
/// letter top-level label. Path, query and fragment are accepted but only
/// loosely constrained.
pub fn is_valid_url(url: &str) -> bool {
    VALID_URL_RE.is_match(url)
}

/// Extract every URL-looking token from `text`, in order of appearance.
///
/// Duplicates are kept. Returns an empty vec when nothing matches.
pub fn extract_urls(text: &str) -> Vec<String> {
    if !text.contains("http") {
        return Vec::new();
    }

    CANDIDATE_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|candidate| is_valid_url(candidate))
        .map(String::from)
        .collect()
}
