//! HTTP fetch primitive
//!
//! Features:
//! - HTTP/2 multiplexing for the batch fan-out
//! - TLS 1.3 via rustls
//! - Brotli, Zstd, Gzip compression (auto-negotiated)
//! - Connection pooling with keep-alive
//! - Body size cap so one huge page can't stall a batch

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, info, instrument};

use crate::error::{LinkError, Result};
use crate::settings::Settings;

/// Largest page body kept for metadata parsing.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Returns the body text of a URL.
///
/// This is the host's raw fetch primitive. Network errors and non-success
/// statuses come back as [`LinkError::Fetch`]; callers decide whether that
/// aborts anything.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// reqwest-backed [`PageFetcher`]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with default settings
    pub fn new() -> anyhow::Result<Self> {
        Self::with_settings(&Settings::default())
    }

    /// Create a fetcher honouring the timeout and user agent in `settings`
    pub fn with_settings(settings: &Settings) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.9"),
        );

        let client = Client::builder()
            // Keep connections alive for reuse across a batch
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .zstd(true)
            .gzip(true)
            .deflate(true)
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .cookie_store(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("Fetching page");
        let fetch_error = |reason: String| LinkError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        info!(
            status = %status,
            version = ?response.version(),
            "Response received"
        );

        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {status}")));
        }

        let mut text = response
            .text()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        truncate_body(&mut text);
        Ok(text)
    }
}

/// Cut `text` down to [`MAX_BODY_BYTES`] on a char boundary.
fn truncate_body(text: &mut String) {
    if text.len() <= MAX_BODY_BYTES {
        return;
    }
    let mut end = MAX_BODY_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    debug!(original = text.len(), kept = end, "Truncating page body");
    text.truncate(end);
}
