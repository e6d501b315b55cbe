//! `metalinks` - URLs in a text selection → metadata link cards, and back
//!
//! # Features
//!
//! - **Extraction**: permissive HTTP(S) URL scan over free text
//! - **Metadata**: title, description, icon, preview image and canonical URL
//!   from Open Graph, Twitter and plain HTML tags
//! - **Batch resolution**: every URL fetched concurrently, failures degraded
//!   per URL instead of aborting the batch
//! - **Rendering**: styled link cards or a plain markdown list
//! - **Undo**: recover the bare URLs from either rendered form
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use metalinks::{HttpFetcher, MetadataLinks, RecordingNotifier, Settings, TextBuffer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let links = MetadataLinks::new(Arc::new(HttpFetcher::new()?));
//!     let buffer = TextBuffer::new("read https://example.com later");
//!     let notifier = RecordingNotifier::new();
//!
//!     links.convert_selection(&buffer, &notifier, &Settings::default()).await;
//!     println!("{}", buffer.text().await);
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod editor;
pub mod error;
pub mod extract;
pub mod http_client;
pub mod metadata;
pub mod render;
pub mod resolve;
pub mod settings;
pub mod undo;

pub use commands::{ConvertReport, MetadataLinks, UndoReport};
pub use editor::{Editor, Notifier, OperationGuard, RecordingNotifier, StderrNotifier, TextBuffer};
pub use error::{LinkError, Result};
pub use extract::{extract_urls, is_valid_url};
pub use http_client::{HttpFetcher, PageFetcher};
pub use metadata::{fetch_metadata, parse_metadata, MetadataRecord};
pub use render::{render, RenderMode, RenderOptions};
pub use resolve::{BatchOutcome, BatchResolver};
pub use settings::{FileSettingsStore, Settings, SettingsStore};
pub use undo::{join_urls, ReverseExtractor, UrlStrategy};

/// Version of metalinks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
