//! Storage-layer errors and their mapping onto core errors.

use diesel::r2d2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Database connection failed: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::PoolError),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Background task failed: {0}")]
    Task(String),

    /// A core error raised inside a write transaction.
    #[error(transparent)]
    Core(#[from] fieldsync_core::Error),
}

impl From<StorageError> for fieldsync_core::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Core(inner) => inner,
            other => fieldsync_core::Error::storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_pass_through_unchanged() {
        let err: fieldsync_core::Error =
            StorageError::Core(fieldsync_core::Error::validation("bad")).into();
        assert!(matches!(err, fieldsync_core::Error::Validation(_)));

        let err: fieldsync_core::Error = StorageError::Migration("boom".to_string()).into();
        assert!(matches!(err, fieldsync_core::Error::Storage(message) if message.contains("boom")));
    }
}
