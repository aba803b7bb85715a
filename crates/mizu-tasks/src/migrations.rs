//! SQL DDL for the task tracker tables.
//!
//! Creates the `tasks`, `tags`, and `task_tags` tables. The binary calls
//! [`run_migrations`] at startup, before serving requests; tests call it
//! against in-memory databases.

use rusqlite::Connection;

use crate::errors::TaskError;

/// Run all migrations.
///
/// Idempotent — safe to call multiple times (uses `IF NOT EXISTS`).
pub fn run_migrations(conn: &Connection) -> Result<(), TaskError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Combined DDL for all tables.
const SCHEMA: &str = r"
-- Tasks table
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    note TEXT,
    status TEXT NOT NULL DEFAULT 'inbox'
        CHECK(status IN ('inbox', 'next', 'doing', 'waiting', 'done')),
    due_at TEXT,
    today_rank INTEGER
        CHECK(today_rank IS NULL OR today_rank BETWEEN 1 AND 3),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    done_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_tasks_status_created
    ON tasks(status, created_at);
CREATE INDEX IF NOT EXISTS idx_tasks_today_rank
    ON tasks(today_rank) WHERE today_rank IS NOT NULL;

-- Tags table
CREATE TABLE IF NOT EXISTS tags (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    key TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Task-tag association (many-to-many, no ordering semantics)
CREATE TABLE IF NOT EXISTS task_tags (
    task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    tag_id TEXT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (task_id, tag_id)
);

CREATE INDEX IF NOT EXISTS idx_task_tags_tag
    ON task_tags(tag_id);
";
