//! Batch metadata resolution.
//!
//! Every URL of a batch is fetched concurrently, one Tokio task each, with
//! no cap on in-flight requests. The resolver waits for all of them to
//! settle, then parses each settled body. A URL that fails to fetch or
//! parse still yields a record (see [`MetadataRecord::degraded`]), so the
//! output is always index-aligned with the input.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use metalinks::{BatchResolver, HttpFetcher};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = BatchResolver::new(Arc::new(HttpFetcher::new()?));
//! let urls = vec!["https://example.com".to_string()];
//! let outcome = resolver.resolve_all(&urls).await?;
//! println!("{} resolved, {} failed", outcome.resolved, outcome.failed);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::error::{LinkError, Result};
use crate::http_client::PageFetcher;
use crate::metadata::{parse_metadata, MetadataRecord};

/// Result of one batch resolution.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One record per input URL, in input order.
    pub records: Vec<MetadataRecord>,
    /// URLs whose fetch and parse both succeeded.
    pub resolved: usize,
    /// URLs that were degraded after a fetch or parse failure.
    pub failed: usize,
}

/// Drives a [`PageFetcher`] over a list of URLs.
pub struct BatchResolver {
    fetcher: Arc<dyn PageFetcher>,
}

impl BatchResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Resolve every URL into a [`MetadataRecord`].
    ///
    /// Per-URL failures are degraded, never returned. The only error is
    /// [`LinkError::Batch`], raised when a fetch task dies (panic or
    /// cancellation) instead of settling, or when the fetcher reports a
    /// failure that is not scoped to one URL.
    pub async fn resolve_all(&self, urls: &[String]) -> Result<BatchOutcome> {
        if urls.is_empty() {
            return Ok(BatchOutcome::default());
        }

        info!("Resolving metadata for {} URLs", urls.len());

        let pages = self.fetch_all(urls).await?;

        let mut outcome = BatchOutcome {
            records: Vec::with_capacity(urls.len()),
            ..BatchOutcome::default()
        };

        for (url, page) in urls.iter().zip(pages) {
            match parse_settled(url, page) {
                Ok(record) => {
                    outcome.resolved += 1;
                    outcome.records.push(record);
                }
                Err(e) if !e.is_per_url() => {
                    error!("Batch aborted at {}: {}", url, e);
                    return Err(LinkError::Batch(e.to_string()));
                }
                Err(e) => {
                    warn!("Degrading {}: {}", url, e);
                    outcome.failed += 1;
                    outcome.records.push(MetadataRecord::degraded(url.as_str()));
                }
            }
        }

        info!(
            resolved = outcome.resolved,
            failed = outcome.failed,
            "Batch settled"
        );
        Ok(outcome)
    }

    /// Fetch stage: launch every request at once and wait for all of them.
    async fn fetch_all(&self, urls: &[String]) -> Result<Vec<Result<String>>> {
        let handles = urls.iter().map(|url| {
            let fetcher = Arc::clone(&self.fetcher);
            let url = url.clone();
            tokio::spawn(async move {
                debug!("Fetching {}", url);
                fetcher.fetch_text(&url).await
            })
        });

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.map_err(|e| LinkError::Batch(e.to_string())))
            .collect()
    }
}

/// Parse stage for one settled fetch.
///
/// A failed fetch arrives here as its error and passes straight through,
/// so the caller sees one uniform failure path.
fn parse_settled(url: &str, page: Result<String>) -> Result<MetadataRecord> {
    let body = page?;
    parse_metadata(&body, url)
}
