//! Recover the original URLs from rendered link output.
//!
//! # Architecture
//!
//! - [`UrlStrategy`]: one per known rendered representation
//! - [`ReverseExtractor`]: applies every strategy that detects its format
//!
//! Strategies are applied independently and their results concatenated in
//! registration order, so a selection mixing plain lines and cards yields
//! the plain URLs first, then the card URLs.
//!
//! # Example
//!
//! ```rust
//! use metalinks::undo::{join_urls, ReverseExtractor};
//!
//! let extractor = ReverseExtractor::new();
//! let urls = extractor.extract_original_urls("- [Example](https://example.com): A page");
//! assert_eq!(join_urls(&urls), "https://example.com");
//! ```

mod anchor;
mod markdown;

pub use anchor::AnchorHrefStrategy;
pub use markdown::MarkdownLinkStrategy;

/// Recovers URLs from one rendered representation.
pub trait UrlStrategy: Send + Sync {
    /// Strategy name (e.g., "markdown", "anchor").
    fn name(&self) -> &'static str;

    /// Cheap content sniff: could `text` contain this representation?
    fn detects(&self, text: &str) -> bool;

    /// Every URL this representation encodes, in order of appearance.
    fn extract(&self, text: &str) -> Vec<String>;
}

/// Applies registered [`UrlStrategy`]s in order and concatenates results.
pub struct ReverseExtractor {
    strategies: Vec<Box<dyn UrlStrategy>>,
}

impl ReverseExtractor {
    /// Extractor for the two built-in representations: plain links first,
    /// then anchor cards.
    #[must_use]
    pub fn new() -> Self {
        let strategies: Vec<Box<dyn UrlStrategy>> = vec![
            Box::new(MarkdownLinkStrategy),
            Box::new(AnchorHrefStrategy),
        ];

        Self { strategies }
    }

    /// Extractor with a caller-chosen strategy list.
    pub fn with_strategies(strategies: Vec<Box<dyn UrlStrategy>>) -> Self {
        Self { strategies }
    }

    /// Names of the registered strategies, in application order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Recover URLs from previously rendered text.
    ///
    /// Returns an empty vec when no strategy recognises anything.
    pub fn extract_original_urls(&self, text: &str) -> Vec<String> {
        let mut urls = Vec::new();
        for strategy in &self.strategies {
            if strategy.detects(text) {
                let found = strategy.extract(text);
                tracing::debug!("Strategy {} recovered {} URLs", strategy.name(), found.len());
                urls.extend(found);
            }
        }
        urls
    }
}

impl Default for ReverseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Newline-joined block, the form written back into the editor.
pub fn join_urls(urls: &[String]) -> String {
    urls.join("\n")
}
