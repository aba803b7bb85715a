//! Task CRUD and quick-action handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mizu_tasks::{TaskCreateParams, TaskService, TaskUpdateParams, TaskWithTags};

use crate::error::ApiError;
use crate::state::AppState;

use super::{validate_rank, validate_title};

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(params): Json<TaskCreateParams>,
) -> Result<(StatusCode, Json<TaskWithTags>), ApiError> {
    validate_title(&params.title)?;
    if let Some(rank) = params.today_rank {
        validate_rank(rank)?;
    }
    let mut conn = state.conn()?;
    let created = TaskService::create_task(&mut conn, params)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /tasks
pub async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskWithTags>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(TaskService::list_all(&conn)?))
}

/// GET /tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskWithTags>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(TaskService::get_task(&conn, &id)?))
}

/// PATCH /tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(updates): Json<TaskUpdateParams>,
) -> Result<Json<TaskWithTags>, ApiError> {
    if let Some(title) = &updates.title {
        validate_title(title)?;
    }
    if let Some(Some(rank)) = updates.today_rank {
        validate_rank(rank)?;
    }
    let mut conn = state.conn()?;
    Ok(Json(TaskService::update_task(&mut conn, &id, updates)?))
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = state.conn()?;
    if TaskService::delete_task(&conn, &id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Task not found: {id}")))
    }
}

/// POST /tasks/{id}/promote
pub async fn promote_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskWithTags>, ApiError> {
    let mut conn = state.conn()?;
    Ok(Json(TaskService::promote_to_next(&mut conn, &id)?))
}

/// POST /tasks/{id}/complete
pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskWithTags>, ApiError> {
    let mut conn = state.conn()?;
    Ok(Json(TaskService::complete_task(&mut conn, &id)?))
}
