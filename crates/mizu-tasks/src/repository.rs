//! SQL data access layer for tasks and tags.
//!
//! All methods take a `&Connection` parameter and are stateless — pure
//! functions that translate between Rust types and SQL. Uses
//! `uuid::Uuid::now_v7()` for time-ordered ID generation with
//! entity-specific prefixes; view queries use `id DESC` as the tiebreak on
//! equal timestamps for that reason.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::errors::TaskError;
use crate::types::{Tag, Task, TaskStatus};

/// Generate a prefixed UUID v7 ID.
pub(crate) fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7())
}

/// Get current UTC timestamp as ISO 8601 string.
pub(crate) fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn task_from_row(row: &rusqlite::Row<'_>) -> Task {
    let status_str: String = row.get_unwrap("status");
    Task {
        id: row.get_unwrap("id"),
        title: row.get_unwrap("title"),
        note: row.get_unwrap("note"),
        status: match status_str.as_str() {
            "next" => TaskStatus::Next,
            "doing" => TaskStatus::Doing,
            "waiting" => TaskStatus::Waiting,
            "done" => TaskStatus::Done,
            _ => TaskStatus::Inbox,
        },
        due_at: row.get_unwrap("due_at"),
        today_rank: row.get_unwrap("today_rank"),
        created_at: row.get_unwrap("created_at"),
        updated_at: row.get_unwrap("updated_at"),
        done_at: row.get_unwrap("done_at"),
    }
}

fn tag_from_row(row: &rusqlite::Row<'_>) -> Tag {
    Tag {
        id: row.get_unwrap("id"),
        name: row.get_unwrap("name"),
        key: row.get_unwrap("key"),
        created_at: row.get_unwrap("created_at"),
    }
}

/// Task repository for SQL CRUD operations and view queries.
pub struct TaskRepository;

impl TaskRepository {
    // ─────────────────────────────────────────────────────────────────────
    // Task CRUD
    // ─────────────────────────────────────────────────────────────────────

    /// Insert a fully-formed task row.
    ///
    /// The caller (the service layer) is responsible for having run the
    /// status invariants on `task` beforehand.
    pub fn insert_task(conn: &Connection, task: &Task) -> Result<(), TaskError> {
        let _ = conn.execute(
            "INSERT INTO tasks (id, title, note, status, due_at, today_rank,
             created_at, updated_at, done_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                task.id,
                task.title,
                task.note,
                task.status.as_sql(),
                task.due_at,
                task.today_rank,
                task.created_at,
                task.updated_at,
                task.done_at,
            ],
        )?;
        Ok(())
    }

    /// Get a task by ID.
    pub fn get_task(conn: &Connection, id: &str) -> Result<Option<Task>, TaskError> {
        let task = conn
            .query_row("SELECT * FROM tasks WHERE id = ?1", params![id], |row| {
                Ok(task_from_row(row))
            })
            .optional()?;
        Ok(task)
    }

    /// Write all mutable columns of a task row. Returns false if not found.
    pub fn update_task(conn: &Connection, task: &Task) -> Result<bool, TaskError> {
        let changed = conn.execute(
            "UPDATE tasks SET title = ?1, note = ?2, status = ?3, due_at = ?4,
             today_rank = ?5, updated_at = ?6, done_at = ?7
             WHERE id = ?8",
            params![
                task.title,
                task.note,
                task.status.as_sql(),
                task.due_at,
                task.today_rank,
                task.updated_at,
                task.done_at,
                task.id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a task by ID. Returns true if a row was deleted.
    ///
    /// Association rows go with it via `ON DELETE CASCADE`.
    pub fn delete_task(conn: &Connection, id: &str) -> Result<bool, TaskError> {
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Today-rank conflict resolution
    // ─────────────────────────────────────────────────────────────────────

    /// Clear `today_rank` from every task holding `rank`, except
    /// `exclude_task_id` (so an updated task does not evict itself).
    ///
    /// This is the one declared cross-task side effect of a task write.
    /// Must run strictly after the status invariants, inside the same
    /// transaction as the main write, so the post-invariant rank is what
    /// gets checked for conflicts. Returns the number of evicted tasks.
    pub fn clear_conflicting_rank(
        conn: &Connection,
        rank: i32,
        exclude_task_id: Option<&str>,
    ) -> Result<usize, TaskError> {
        let now = now_iso();
        let cleared = match exclude_task_id {
            Some(exclude) => conn.execute(
                "UPDATE tasks SET today_rank = NULL, updated_at = ?1
                 WHERE today_rank = ?2 AND id != ?3",
                params![now, rank, exclude],
            )?,
            None => conn.execute(
                "UPDATE tasks SET today_rank = NULL, updated_at = ?1
                 WHERE today_rank = ?2",
                params![now, rank],
            )?,
        };
        Ok(cleared)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tag associations
    // ─────────────────────────────────────────────────────────────────────

    /// Replace a task's tag set with the given tag ids.
    ///
    /// Ids that do not resolve to an existing tag are silently dropped —
    /// a deliberate leniency, not a validation failure. An empty slice
    /// unlinks everything.
    pub fn replace_task_tags(
        conn: &Connection,
        task_id: &str,
        tag_ids: &[String],
    ) -> Result<(), TaskError> {
        let _ = conn.execute(
            "DELETE FROM task_tags WHERE task_id = ?1",
            params![task_id],
        )?;
        for tag_id in tag_ids {
            // INSERT..SELECT drops unresolvable ids; OR IGNORE drops
            // duplicates within the input.
            let _ = conn.execute(
                "INSERT OR IGNORE INTO task_tags (task_id, tag_id)
                 SELECT ?1, id FROM tags WHERE id = ?2",
                params![task_id, tag_id],
            )?;
        }
        Ok(())
    }

    /// Get the tags associated with a task, ordered by name.
    pub fn list_task_tags(conn: &Connection, task_id: &str) -> Result<Vec<Tag>, TaskError> {
        let mut stmt = conn.prepare(
            "SELECT t.* FROM tags t
             JOIN task_tags tt ON tt.tag_id = t.id
             WHERE tt.task_id = ?1
             ORDER BY t.name",
        )?;
        let tags = stmt
            .query_map(params![task_id], |row| Ok(tag_from_row(row)))?
            .filter_map(Result::ok)
            .collect();
        Ok(tags)
    }

    // ─────────────────────────────────────────────────────────────────────
    // View queries
    // ─────────────────────────────────────────────────────────────────────

    /// Inbox: unsorted captures (`status = inbox`), newest first.
    pub fn list_inbox(conn: &Connection) -> Result<Vec<Task>, TaskError> {
        Self::query_tasks(
            conn,
            "SELECT * FROM tasks WHERE status = 'inbox'
             ORDER BY created_at DESC, id DESC",
        )
    }

    /// Today: ranked tasks, in slot order (1, 2, 3).
    pub fn list_today(conn: &Connection) -> Result<Vec<Task>, TaskError> {
        Self::query_tasks(
            conn,
            "SELECT * FROM tasks WHERE today_rank IS NOT NULL
             ORDER BY today_rank",
        )
    }

    /// Backlog: actionable but unranked (`next`/`doing`/`waiting`,
    /// no Today slot), newest first.
    pub fn list_backlog(conn: &Connection) -> Result<Vec<Task>, TaskError> {
        Self::query_tasks(
            conn,
            "SELECT * FROM tasks
             WHERE status IN ('next', 'doing', 'waiting') AND today_rank IS NULL
             ORDER BY created_at DESC, id DESC",
        )
    }

    /// Done: completed tasks, most recently completed first.
    pub fn list_done(conn: &Connection) -> Result<Vec<Task>, TaskError> {
        Self::query_tasks(
            conn,
            "SELECT * FROM tasks WHERE status = 'done'
             ORDER BY done_at DESC, id DESC",
        )
    }

    /// All tasks, newest first.
    pub fn list_all(conn: &Connection) -> Result<Vec<Task>, TaskError> {
        Self::query_tasks(
            conn,
            "SELECT * FROM tasks ORDER BY created_at DESC, id DESC",
        )
    }

    fn query_tasks(conn: &Connection, sql: &str) -> Result<Vec<Task>, TaskError> {
        let mut stmt = conn.prepare(sql)?;
        let tasks = stmt
            .query_map([], |row| Ok(task_from_row(row)))?
            .filter_map(Result::ok)
            .collect();
        Ok(tasks)
    }
}

/// Tag repository for SQL CRUD operations.
pub struct TagRepository;

impl TagRepository {
    /// Create a new tag. Pure insert — the duplicate-key pre-check is the
    /// caller's responsibility; the UNIQUE constraint on `key` backs it up.
    pub fn create_tag(conn: &Connection, name: &str) -> Result<Tag, TaskError> {
        let tag = Tag {
            id: generate_id("tag"),
            name: name.to_string(),
            key: Tag::normalize_key(name),
            created_at: now_iso(),
        };
        let _ = conn.execute(
            "INSERT INTO tags (id, name, key, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![tag.id, tag.name, tag.key, tag.created_at],
        )?;
        Ok(tag)
    }

    /// Get a tag by ID.
    pub fn get_tag(conn: &Connection, id: &str) -> Result<Option<Tag>, TaskError> {
        let tag = conn
            .query_row("SELECT * FROM tags WHERE id = ?1", params![id], |row| {
                Ok(tag_from_row(row))
            })
            .optional()?;
        Ok(tag)
    }

    /// Get a tag by normalized key.
    pub fn get_tag_by_key(conn: &Connection, key: &str) -> Result<Option<Tag>, TaskError> {
        let tag = conn
            .query_row("SELECT * FROM tags WHERE key = ?1", params![key], |row| {
                Ok(tag_from_row(row))
            })
            .optional()?;
        Ok(tag)
    }

    /// Get all tags, ordered by name ascending.
    pub fn list_tags(conn: &Connection) -> Result<Vec<Tag>, TaskError> {
        let mut stmt = conn.prepare("SELECT * FROM tags ORDER BY name")?;
        let tags = stmt
            .query_map([], |row| Ok(tag_from_row(row)))?
            .filter_map(Result::ok)
            .collect();
        Ok(tags)
    }

    /// Delete a tag by ID. Returns true if a row was deleted.
    ///
    /// Association rows cascade; tasks keep their other tags.
    pub fn delete_tag(conn: &Connection, id: &str) -> Result<bool, TaskError> {
        let changed = conn.execute("DELETE FROM tags WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}
