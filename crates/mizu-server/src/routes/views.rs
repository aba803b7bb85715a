//! The four read-side views.
//!
//! Every non-deleted task belongs to exactly one of these, determined by
//! its status and rank. Sort orders are fixed per view; there are no query
//! parameters.

use axum::extract::State;
use axum::Json;
use mizu_tasks::{TaskService, TaskWithTags};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /views/inbox — unsorted captures, newest first.
pub async fn inbox(State(state): State<AppState>) -> Result<Json<Vec<TaskWithTags>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(TaskService::list_inbox(&conn)?))
}

/// GET /views/today — the ranked tasks in slot order.
pub async fn today(State(state): State<AppState>) -> Result<Json<Vec<TaskWithTags>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(TaskService::list_today(&conn)?))
}

/// GET /views/backlog — actionable but unranked, newest first.
pub async fn backlog(State(state): State<AppState>) -> Result<Json<Vec<TaskWithTags>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(TaskService::list_backlog(&conn)?))
}

/// GET /views/done — completed, most recently completed first.
pub async fn done(State(state): State<AppState>) -> Result<Json<Vec<TaskWithTags>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(TaskService::list_done(&conn)?))
}
