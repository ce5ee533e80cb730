//! Error kinds surfaced by the todo service.
//!
//! # Design
//! `TodoError` is what the store operations return to the HTTP layer. Only
//! `NotFound` gets its own status code; validation and storage failures both
//! map to 500, matching the API's published contract. `StorageError` stays
//! separate so store implementations never have to know about validation or
//! lookups by id.

use axum::http::StatusCode;
use thiserror::Error;

/// Failures of the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the snapshot file failed.
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot file could not be encoded or decoded.
    #[error("snapshot is not valid JSON: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The backing store refused the operation for any other reason.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by `TodoService` operations.
#[derive(Debug, Error)]
pub enum TodoError {
    /// Malformed or missing required input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The targeted id does not exist. Holds the id as the caller supplied it.
    #[error("todo {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TodoError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TodoError::Validation(msg.into())
    }

    /// HTTP status for this error: 404 for a missing todo, 500 for anything else.
    pub fn status(&self) -> StatusCode {
        match self {
            TodoError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoError::Validation(_) | TodoError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
