//! Error types for Cadence core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A timestamp is not in the zero-padded UTC form required for
    /// last-write-wins ordering.
    #[error("timestamp {value:?} is not zero-padded UTC ISO-8601")]
    InvalidTimestamp {
        /// The offending value.
        value: String,
    },
}
