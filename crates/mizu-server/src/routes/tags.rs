//! Tag handlers.
//!
//! Tag creation pre-checks the normalized key and answers 409 on a
//! duplicate. The UNIQUE constraint on `tags.key` covers the race where
//! two creates slip past the pre-check; that path surfaces through the
//! constraint-violation mapping in [`crate::error`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mizu_tasks::{Tag, TagRepository};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

use super::validate_tag_name;

/// Body for POST /tags.
#[derive(Debug, Deserialize)]
pub struct TagCreateParams {
    /// Display name; identity is its trimmed, lower-cased key.
    pub name: String,
}

/// POST /tags
pub async fn create_tag(
    State(state): State<AppState>,
    Json(params): Json<TagCreateParams>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    validate_tag_name(&params.name)?;
    let conn = state.conn()?;

    let key = Tag::normalize_key(&params.name);
    if TagRepository::get_tag_by_key(&conn, &key)?.is_some() {
        return Err(ApiError::Conflict(format!("tag already exists: {key}")));
    }
    let tag = TagRepository::create_tag(&conn, &params.name)?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// GET /tags
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(TagRepository::list_tags(&conn)?))
}

/// GET /tags/{id}
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Tag>, ApiError> {
    let conn = state.conn()?;
    let tag = TagRepository::get_tag(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Tag not found: {id}")))?;
    Ok(Json(tag))
}

/// DELETE /tags/{id}
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = state.conn()?;
    if TagRepository::delete_tag(&conn, &id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Tag not found: {id}")))
    }
}
