//! Error taxonomy for the conversion pipeline.
//!
//! Per-URL failures ([`LinkError::Fetch`], [`LinkError::Parse`]) never leave
//! the batch resolver; they are degraded into empty records there. Only
//! [`LinkError::Batch`] and [`LinkError::NoSelection`] reach the entry points.

use thiserror::Error;

/// Conversion pipeline errors
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("nothing selected")]
    NoSelection,

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("parse failed for {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("batch resolution failed: {0}")]
    Batch(String),
}

impl LinkError {
    /// Whether this failure is isolated to a single URL of a batch.
    pub fn is_per_url(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Parse { .. })
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;
