//! Error types for storage

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database schema error: {0}")]
    Schema(#[from] sqlx::migrate::MigrateError),

    #[error("Storage quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Project not found: {0}")]
    NotFound(String),
}

impl StorageError {
    /// Failures that may succeed on a later attempt against the same backend
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::Io(_) | StorageError::Database(_) | StorageError::Unavailable(_)
        )
    }
}

/// Storage Result type alias
pub type StorageResult<T> = Result<T, StorageError>;
