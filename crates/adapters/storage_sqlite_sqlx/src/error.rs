//! Storage-specific error type wrapping sqlx errors.

use loopctl_domain::error::LoopError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be read as the requested type.
    #[error("setting `{key}` holds unreadable value `{value}`")]
    InvalidValue { key: String, value: String },
}

impl From<StorageError> for LoopError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
