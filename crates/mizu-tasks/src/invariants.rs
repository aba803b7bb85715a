//! Invariant engine for the task write path.
//!
//! Pure, in-memory corrections applied whenever a task's `status` or
//! `today_rank` is set or changes:
//!
//! - `done_at` is non-null iff `status == done`; an already-recorded
//!   completion time is never overwritten.
//! - `today_rank` may only be held while `status` is next/doing; any other
//!   status forces it to null.
//!
//! Order of operations matters for the whole write path: (1) apply field
//! changes, (2) apply these status invariants, (3) resolve the rank
//! conflict using the post-invariant rank (see
//! [`TaskRepository::clear_conflicting_rank`]). Running (3) before (2)
//! would let a task whose rank is about to be nulled evict another task.
//!
//! [`TaskRepository::clear_conflicting_rank`]: crate::repository::TaskRepository::clear_conflicting_rank

use crate::types::{Task, TaskStatus};

/// Get current UTC timestamp as ISO 8601 string.
fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Apply status-driven invariants to a task in place.
///
/// `new_status` overrides the task's current status when supplied; either
/// way the task ends up carrying the effective status. Idempotent: calling
/// this twice with the same target status leaves `done_at` unchanged.
pub fn apply_status_invariants(task: &mut Task, new_status: Option<TaskStatus>) {
    let status = new_status.unwrap_or(task.status);
    task.status = status;

    if status == TaskStatus::Done {
        if task.done_at.is_none() {
            task.done_at = Some(now_iso());
        }
    } else {
        task.done_at = None;
    }

    if !status.allows_today_rank() {
        task.today_rank = None;
    }
}
