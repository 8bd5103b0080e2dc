//! Error types for the sync client.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
///
/// All of these are caught at the sync-client boundary: they surface in
/// [`crate::SyncStatus`] and the log, never to UI code.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The server rejected the session (HTTP 401). Treated as "not
    /// authenticated": sync pauses and local data is untouched.
    #[error("session rejected by server")]
    Auth,

    /// The response body could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The local store failed to persist or read state.
    #[error("store error: {0}")]
    Store(#[from] cadence_store::StoreError),

    /// The session gate reports unauthenticated; the operation was not
    /// attempted.
    #[error("not authenticated")]
    NotAuthenticated,
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if the operation may succeed on a later trigger.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Transport { retryable: true, .. })
    }

    /// Returns true if this error means the user is not (or no longer)
    /// authenticated.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Auth | SyncError::NotAuthenticated)
    }
}
