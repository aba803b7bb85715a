//! Route handlers, grouped by resource.
//!
//! Request validation happens here at the boundary; anything that passes is
//! handed to `mizu_tasks` unchecked. The shared limits live in this module
//! so the task and tag handlers agree on them.

pub mod health;
pub mod tags;
pub mod tasks;
pub mod views;

use crate::error::ApiError;

/// Maximum title length in Unicode code points.
const MAX_TITLE_LEN: usize = 255;

/// Maximum tag name length in Unicode code points.
const MAX_TAG_NAME_LEN: usize = 100;

/// Validate a task title: non-blank, at most [`MAX_TITLE_LEN`] code points.
pub(crate) fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation("title must not be blank".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a tag name: non-blank, at most [`MAX_TAG_NAME_LEN`] code points.
pub(crate) fn validate_tag_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be blank".to_string()));
    }
    if name.chars().count() > MAX_TAG_NAME_LEN {
        return Err(ApiError::Validation(format!(
            "name must be at most {MAX_TAG_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a Today rank: only slots 1 through 3 exist.
pub(crate) fn validate_rank(rank: i32) -> Result<(), ApiError> {
    if !(1..=3).contains(&rank) {
        return Err(ApiError::Validation(
            "todayRank must be between 1 and 3".to_string(),
        ));
    }
    Ok(())
}
