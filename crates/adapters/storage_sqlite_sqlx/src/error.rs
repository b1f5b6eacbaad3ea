//! Storage-specific error type wrapping sqlx errors.

use scenariobot_domain::error::BotError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored unix timestamp is out of range.
    #[error("invalid timestamp {0}")]
    InvalidTimestamp(i64),

    /// A stored capture group index is negative or too large.
    #[error("invalid capture group {0}")]
    InvalidCaptureGroup(i64),
}

impl From<StorageError> for BotError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Wrap a decoding failure the way sqlx reports column errors.
pub(crate) fn decode(err: StorageError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}
