//! Error types for the editor

use onepager_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// The edit is kept in memory; the next successful save makes it durable
    #[error("Failed to save project {project_id}: {source}")]
    Save {
        project_id: String,
        #[source]
        source: StorageError,
    },

    #[error("Invalid JSON document: {0}")]
    Import(#[source] serde_json::Error),

    #[error("Failed to export document: {0}")]
    Export(#[source] serde_json::Error),
}

/// Editor Result type alias
pub type EditorResult<T> = Result<T, EditorError>;
