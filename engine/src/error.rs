//! Error types for the catalog engine.

use crate::ProductId;
use thiserror::Error;

/// All possible errors from the catalog engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Source errors
    #[error("catalog source unavailable: {0}")]
    SourceUnavailable(String),

    // Store errors
    #[error("failed to persist product {id}: {reason}")]
    StoreWriteFailed { id: ProductId, reason: String },

    #[error("store query failed: {0}")]
    StoreQueryFailed(String),

    // Scheduling errors
    #[error("a sync pass is already in progress")]
    SyncInProgress,
}

impl Error {
    /// Shorthand for a write failure on a single product.
    pub fn write_failed(id: ProductId, reason: impl Into<String>) -> Self {
        Self::StoreWriteFailed {
            id,
            reason: reason.into(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
