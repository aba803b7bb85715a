//! Core types for the task tracker.
//!
//! All serializable types use `camelCase` on the wire. `Task` and `Tag`
//! mirror their SQL rows exactly; composites like [`TaskWithTags`] flatten
//! the row and attach related entities.

use serde::{Deserialize, Deserializer, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Enums
// ─────────────────────────────────────────────────────────────────────────────

/// Task status in the lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Newly captured, awaiting triage.
    #[default]
    Inbox,
    /// Ready to work on.
    Next,
    /// Currently being worked on.
    Doing,
    /// Blocked on something external.
    Waiting,
    /// Completed.
    Done,
}

impl TaskStatus {
    /// SQL string representation (matches the `SQLite` CHECK constraint values).
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Next => "next",
            Self::Doing => "doing",
            Self::Waiting => "waiting",
            Self::Done => "done",
        }
    }

    /// Whether a task in this status may hold a Today rank.
    ///
    /// Only actionable statuses qualify; everything else forces the rank
    /// to null.
    #[must_use]
    pub fn allows_today_rank(self) -> bool {
        matches!(self, Self::Next | Self::Doing)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain types
// ─────────────────────────────────────────────────────────────────────────────

/// A task, shaped exactly like its `tasks` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique ID (prefixed: `task-{uuid}`), assigned at creation.
    pub id: String,
    /// Short description.
    pub title: String,
    /// Optional free-text note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// When this task is due.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<String>,
    /// Today slot (1–3); unique across all tasks while non-null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today_rank: Option<i32>,
    /// Creation timestamp (immutable).
    pub created_at: String,
    /// Refreshed on every mutation.
    pub updated_at: String,
    /// Completion timestamp; present iff `status == done`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_at: Option<String>,
}

/// A tag, shaped exactly like its `tags` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Unique ID (prefixed: `tag-{uuid}`).
    pub id: String,
    /// Display name, as typed by the user.
    pub name: String,
    /// Normalized de-duplication identity; unique across all tags.
    pub key: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl Tag {
    /// Compute the normalized key for a tag name (trim + lower-case).
    ///
    /// The key is a pure function of the name, computed once at creation
    /// and never updated independently.
    #[must_use]
    pub fn normalize_key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

/// Task with its associated tags attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithTags {
    /// The task itself.
    #[serde(flatten)]
    pub task: Task,
    /// Associated tags; order not significant.
    pub tags: Vec<Tag>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Mutation params
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters for creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreateParams {
    /// Short description (required).
    pub title: String,
    /// Free-text note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Initial status (default: inbox).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<String>,
    /// Initial Today slot (1–3).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today_rank: Option<i32>,
    /// Tags to associate; ids that do not resolve are silently dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<String>>,
}

/// Parameters for a partial task update.
///
/// Omitted fields are untouched. Nullable columns (`note`, `due_at`,
/// `today_rank`) are double-wrapped so an explicit `null` in the body
/// (clear the field) is distinguishable from the field being absent.
/// Likewise `tag_ids: []` empties the association set while an omitted
/// `tag_ids` leaves it unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdateParams {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New note; `Some(None)` clears it.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub note: Option<Option<String>>,
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// New due date; `Some(None)` clears it.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_at: Option<Option<String>>,
    /// New Today slot; `Some(None)` clears it.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub today_rank: Option<Option<i32>>,
    /// Replacement tag set; `Some(vec![])` unlinks everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<String>>,
}

/// Deserialize a tri-state field: an absent field stays `None` (via
/// `#[serde(default)]`), an explicit `null` becomes `Some(None)`, and a
/// value becomes `Some(Some(value))`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
