//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Another process holds the data directory lock.
    #[error("data directory locked: another process has exclusive access")]
    Locked,

    /// The snapshot could not be serialized.
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A sync cursor value is not a valid zero-padded UTC timestamp.
    #[error(transparent)]
    InvalidCursor(#[from] cadence_core::CoreError),
}
