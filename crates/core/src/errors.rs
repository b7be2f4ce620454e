//! Error types shared by the record store, queue and sync orchestrator.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core services.
///
/// Record store and queue errors propagate to their callers unchanged. During
/// a flush, transport errors are downgraded to per-item failures instead.
#[derive(Debug, Error)]
pub enum Error {
    /// No row in the file carries the requested key.
    #[error("Record '{key}' not found in {file_id}")]
    NotFound { file_id: String, key: String },

    /// The local tabular file is missing, unreadable or malformed.
    #[error("File unavailable ({file_id}): {message}")]
    FileUnavailable { file_id: String, message: String },

    /// The durable key/value store failed or returned undecodable data.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Remote credentials are absent or were rejected.
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// Transport-level failure talking to the remote file service.
    #[error("Network error: {0}")]
    Network(String),

    /// Caller-supplied payload failed boundary checks.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    pub fn not_found(file_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            file_id: file_id.into(),
            key: key.into(),
        }
    }

    pub fn file_unavailable(file_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileUnavailable {
            file_id: file_id.into(),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("Corrupt stored value: {}", err))
    }
}
