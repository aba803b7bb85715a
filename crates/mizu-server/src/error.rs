//! HTTP-facing error type and status-code mapping.
//!
//! Handlers return [`ApiError`]; `IntoResponse` turns it into a JSON body
//! of the shape `{"error": "..."}` with the matching status code. Domain
//! errors convert via `From<TaskError>`; a constraint violation surfacing
//! from the database maps to `Conflict`, which backstops the duplicate-tag
//! pre-check against races.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mizu_tasks::TaskError;
use serde_json::json;
use thiserror::Error;

/// API-level errors with HTTP status mappings.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404 — entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// 409 — uniqueness violated (duplicate tag key).
    #[error("{0}")]
    Conflict(String),

    /// 422 — a quick-action precondition was violated.
    #[error("{0}")]
    InvalidState(String),

    /// 400 — request payload failed validation.
    #[error("{0}")]
    Validation(String),

    /// 500 — storage or pool failure; details are logged, not returned.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::InvalidState(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match &err {
            TaskError::NotFound { .. } => Self::NotFound(err.to_string()),
            TaskError::InvalidState(_) => Self::InvalidState(err.to_string()),
            TaskError::Database(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Conflict("resource already exists".to_string())
            }
            TaskError::Database(_) | TaskError::Pool(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
