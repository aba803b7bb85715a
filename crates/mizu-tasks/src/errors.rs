//! Error types for task and tag operations.
//!
//! Errors are structured with typed variants for each failure mode. A
//! storage failure propagates unrecovered via `Database`; callers decide
//! how to surface the rest (the HTTP layer maps them to status codes).

use thiserror::Error;

/// Errors from task and tag operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Underlying persistence failure — propagated, not recovered locally.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection pool failure (exhausted or failed to build).
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity type (e.g., "Task", "Tag").
        entity: &'static str,
        /// The ID that was looked up.
        id: String,
    },

    /// A quick-action precondition was violated.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl TaskError {
    /// Create a not-found error for a task.
    pub fn task_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Task",
            id: id.into(),
        }
    }

    /// Create a not-found error for a tag.
    pub fn tag_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Tag",
            id: id.into(),
        }
    }
}
