//! Business logic for task operations.
//!
//! Sits between the HTTP handlers and [`TaskRepository`]: each mutation
//! runs inside a single transaction so the main write, the rank-conflict
//! scan, and the tag-set replacement land atomically. The write path is
//! always field changes first, then [`apply_status_invariants`], then the
//! conflict scan against the post-invariant rank.
//!
//! Tag CRUD has no multi-statement writes and goes straight through
//! [`TagRepository`].
//!
//! [`TagRepository`]: crate::repository::TagRepository

use rusqlite::Connection;

use crate::errors::TaskError;
use crate::invariants::apply_status_invariants;
use crate::repository::{generate_id, now_iso, TaskRepository};
use crate::types::{Task, TaskCreateParams, TaskStatus, TaskUpdateParams, TaskWithTags};

/// Service layer for task operations.
pub struct TaskService;

impl TaskService {
    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Create a task.
    ///
    /// The status invariants run before the insert, so a `today_rank`
    /// supplied alongside a non-actionable status is dropped without
    /// evicting whoever currently holds that slot.
    pub fn create_task(
        conn: &mut Connection,
        params: TaskCreateParams,
    ) -> Result<TaskWithTags, TaskError> {
        let tx = conn.transaction()?;
        let now = now_iso();
        let mut task = Task {
            id: generate_id("task"),
            title: params.title,
            note: params.note,
            status: params.status.unwrap_or_default(),
            due_at: params.due_at,
            today_rank: params.today_rank,
            created_at: now.clone(),
            updated_at: now,
            done_at: None,
        };
        apply_status_invariants(&mut task, None);

        TaskRepository::insert_task(&tx, &task)?;
        if let Some(rank) = task.today_rank {
            let _ = TaskRepository::clear_conflicting_rank(&tx, rank, Some(&task.id))?;
        }
        if let Some(tag_ids) = &params.tag_ids {
            TaskRepository::replace_task_tags(&tx, &task.id, tag_ids)?;
        }
        let tags = TaskRepository::list_task_tags(&tx, &task.id)?;
        tx.commit()?;

        tracing::debug!(task_id = %task.id, status = %task.status, "created task");
        Ok(TaskWithTags { task, tags })
    }

    /// Apply a partial update to a task.
    ///
    /// Omitted fields are untouched; double-wrapped fields distinguish an
    /// explicit null (clear) from absence. `created_at` is never written.
    pub fn update_task(
        conn: &mut Connection,
        id: &str,
        updates: TaskUpdateParams,
    ) -> Result<TaskWithTags, TaskError> {
        let tx = conn.transaction()?;
        let mut task = TaskRepository::get_task(&tx, id)?
            .ok_or_else(|| TaskError::task_not_found(id))?;

        if let Some(title) = updates.title {
            task.title = title;
        }
        if let Some(note) = updates.note {
            task.note = note;
        }
        if let Some(due_at) = updates.due_at {
            task.due_at = due_at;
        }
        if let Some(rank) = updates.today_rank {
            task.today_rank = rank;
        }
        apply_status_invariants(&mut task, updates.status);
        task.updated_at = now_iso();

        let _ = TaskRepository::update_task(&tx, &task)?;
        if let Some(rank) = task.today_rank {
            let _ = TaskRepository::clear_conflicting_rank(&tx, rank, Some(id))?;
        }
        if let Some(tag_ids) = &updates.tag_ids {
            TaskRepository::replace_task_tags(&tx, id, tag_ids)?;
        }
        let tags = TaskRepository::list_task_tags(&tx, id)?;
        tx.commit()?;

        Ok(TaskWithTags { task, tags })
    }

    /// Delete a task. Returns false if it did not exist.
    pub fn delete_task(conn: &Connection, id: &str) -> Result<bool, TaskError> {
        let deleted = TaskRepository::delete_task(conn, id)?;
        if deleted {
            tracing::debug!(task_id = %id, "deleted task");
        }
        Ok(deleted)
    }

    /// Promote an inbox task to `next`.
    ///
    /// Quick triage action; any other starting status is an invalid-state
    /// error and the task is left untouched.
    pub fn promote_to_next(conn: &mut Connection, id: &str) -> Result<TaskWithTags, TaskError> {
        let tx = conn.transaction()?;
        let mut task = TaskRepository::get_task(&tx, id)?
            .ok_or_else(|| TaskError::task_not_found(id))?;
        if task.status != TaskStatus::Inbox {
            return Err(TaskError::InvalidState(format!(
                "only inbox tasks can be promoted (status is {})",
                task.status
            )));
        }

        apply_status_invariants(&mut task, Some(TaskStatus::Next));
        task.updated_at = now_iso();
        let _ = TaskRepository::update_task(&tx, &task)?;
        let tags = TaskRepository::list_task_tags(&tx, id)?;
        tx.commit()?;

        Ok(TaskWithTags { task, tags })
    }

    /// Complete a task from any non-done status.
    ///
    /// Stamps `done_at` and releases any Today slot the task held.
    pub fn complete_task(conn: &mut Connection, id: &str) -> Result<TaskWithTags, TaskError> {
        let tx = conn.transaction()?;
        let mut task = TaskRepository::get_task(&tx, id)?
            .ok_or_else(|| TaskError::task_not_found(id))?;
        if task.status == TaskStatus::Done {
            return Err(TaskError::InvalidState("task is already done".to_string()));
        }

        apply_status_invariants(&mut task, Some(TaskStatus::Done));
        task.updated_at = now_iso();
        let _ = TaskRepository::update_task(&tx, &task)?;
        let tags = TaskRepository::list_task_tags(&tx, id)?;
        tx.commit()?;

        tracing::debug!(task_id = %id, "completed task");
        Ok(TaskWithTags { task, tags })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    /// Get a task with its tags.
    pub fn get_task(conn: &Connection, id: &str) -> Result<TaskWithTags, TaskError> {
        let task = TaskRepository::get_task(conn, id)?
            .ok_or_else(|| TaskError::task_not_found(id))?;
        Self::with_tags(conn, task)
    }

    /// Inbox view: unsorted captures, newest first.
    pub fn list_inbox(conn: &Connection) -> Result<Vec<TaskWithTags>, TaskError> {
        Self::attach_tags(conn, TaskRepository::list_inbox(conn)?)
    }

    /// Today view: the ranked tasks in slot order.
    pub fn list_today(conn: &Connection) -> Result<Vec<TaskWithTags>, TaskError> {
        Self::attach_tags(conn, TaskRepository::list_today(conn)?)
    }

    /// Backlog view: actionable but unranked tasks, newest first.
    pub fn list_backlog(conn: &Connection) -> Result<Vec<TaskWithTags>, TaskError> {
        Self::attach_tags(conn, TaskRepository::list_backlog(conn)?)
    }

    /// Done view: completed tasks, most recently completed first.
    pub fn list_done(conn: &Connection) -> Result<Vec<TaskWithTags>, TaskError> {
        Self::attach_tags(conn, TaskRepository::list_done(conn)?)
    }

    /// All tasks, newest first.
    pub fn list_all(conn: &Connection) -> Result<Vec<TaskWithTags>, TaskError> {
        Self::attach_tags(conn, TaskRepository::list_all(conn)?)
    }

    fn with_tags(conn: &Connection, task: Task) -> Result<TaskWithTags, TaskError> {
        let tags = TaskRepository::list_task_tags(conn, &task.id)?;
        Ok(TaskWithTags { task, tags })
    }

    fn attach_tags(conn: &Connection, tasks: Vec<Task>) -> Result<Vec<TaskWithTags>, TaskError> {
        tasks
            .into_iter()
            .map(|task| Self::with_tags(conn, task))
            .collect()
    }
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use crate::repository::TagRepository;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn create(conn: &mut Connection, params: TaskCreateParams) -> TaskWithTags {
        TaskService::create_task(conn, params).unwrap()
    }

    fn titled(title: &str) -> TaskCreateParams {
        TaskCreateParams {
            title: title.to_string(),
            ..Default::default()
        }
    }

    // --- Creation ---

    #[test]
    fn test_create_defaults_to_inbox() {
        let mut conn = setup_db();
        let created = create(&mut conn, titled("Capture"));
        assert_eq!(created.task.status, TaskStatus::Inbox);
        assert!(created.task.id.starts_with("task-"));
        assert!(created.task.done_at.is_none());
        assert_eq!(created.task.created_at, created.task.updated_at);
        assert!(created.tags.is_empty());
    }

    #[test]
    fn test_create_done_task_gets_done_at() {
        let mut conn = setup_db();
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "Already finished".to_string(),
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        );
        assert!(created.task.done_at.is_some());
    }

    #[test]
    fn test_create_with_rank_and_inbox_status_drops_rank() {
        let mut conn = setup_db();
        let holder = create(
            &mut conn,
            TaskCreateParams {
                title: "Holder".to_string(),
                status: Some(TaskStatus::Next),
                today_rank: Some(1),
                ..Default::default()
            },
        );

        // Rank on an inbox task is forced to null before the conflict scan,
        // so the existing holder keeps its slot.
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "Capture with rank".to_string(),
                today_rank: Some(1),
                ..Default::default()
            },
        );
        assert!(created.task.today_rank.is_none());
        let holder = TaskService::get_task(&conn, &holder.task.id).unwrap();
        assert_eq!(holder.task.today_rank, Some(1));
    }

    #[test]
    fn test_create_with_rank_evicts_holder() {
        let mut conn = setup_db();
        let a = create(
            &mut conn,
            TaskCreateParams {
                title: "A".to_string(),
                status: Some(TaskStatus::Next),
                today_rank: Some(2),
                ..Default::default()
            },
        );
        let b = create(
            &mut conn,
            TaskCreateParams {
                title: "B".to_string(),
                status: Some(TaskStatus::Doing),
                today_rank: Some(2),
                ..Default::default()
            },
        );

        let a = TaskService::get_task(&conn, &a.task.id).unwrap();
        assert!(a.task.today_rank.is_none());
        assert_eq!(b.task.today_rank, Some(2));
        // A lost only its rank, not its status
        assert_eq!(a.task.status, TaskStatus::Next);
    }

    #[test]
    fn test_create_with_tags() {
        let mut conn = setup_db();
        let tag = TagRepository::create_tag(&conn, "Work").unwrap();
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "Tagged".to_string(),
                tag_ids: Some(vec![tag.id.clone(), "tag-bogus".to_string()]),
                ..Default::default()
            },
        );
        assert_eq!(created.tags.len(), 1);
        assert_eq!(created.tags[0].id, tag.id);
    }

    // --- Partial updates ---

    #[test]
    fn test_update_omitted_fields_untouched() {
        let mut conn = setup_db();
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "Original".to_string(),
                note: Some("keep me".to_string()),
                ..Default::default()
            },
        );

        let updated = TaskService::update_task(
            &mut conn,
            &created.task.id,
            TaskUpdateParams {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.task.title, "Renamed");
        assert_eq!(updated.task.note.as_deref(), Some("keep me"));
        assert_eq!(updated.task.created_at, created.task.created_at);
    }

    #[test]
    fn test_update_explicit_null_clears_note() {
        let mut conn = setup_db();
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "Task".to_string(),
                note: Some("scratch".to_string()),
                due_at: Some("2026-09-01T00:00:00Z".to_string()),
                ..Default::default()
            },
        );

        let updated = TaskService::update_task(
            &mut conn,
            &created.task.id,
            TaskUpdateParams {
                note: Some(None),
                due_at: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(updated.task.note.is_none());
        assert!(updated.task.due_at.is_none());
    }

    #[test]
    fn test_update_null_rank_releases_slot() {
        let mut conn = setup_db();
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "Ranked".to_string(),
                status: Some(TaskStatus::Next),
                today_rank: Some(1),
                ..Default::default()
            },
        );

        let updated = TaskService::update_task(
            &mut conn,
            &created.task.id,
            TaskUpdateParams {
                today_rank: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(updated.task.today_rank.is_none());
        assert!(TaskService::list_today(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_update_rank_evicts_other_holder() {
        let mut conn = setup_db();
        let a = create(
            &mut conn,
            TaskCreateParams {
                title: "A".to_string(),
                status: Some(TaskStatus::Next),
                today_rank: Some(1),
                ..Default::default()
            },
        );
        let b = create(
            &mut conn,
            TaskCreateParams {
                title: "B".to_string(),
                status: Some(TaskStatus::Next),
                ..Default::default()
            },
        );

        let b = TaskService::update_task(
            &mut conn,
            &b.task.id,
            TaskUpdateParams {
                today_rank: Some(Some(1)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(b.task.today_rank, Some(1));
        let a = TaskService::get_task(&conn, &a.task.id).unwrap();
        assert!(a.task.today_rank.is_none());

        let today = TaskService::list_today(&conn).unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].task.id, b.task.id);
    }

    #[test]
    fn test_update_keeping_own_rank_does_not_self_evict() {
        let mut conn = setup_db();
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "Ranked".to_string(),
                status: Some(TaskStatus::Next),
                today_rank: Some(2),
                ..Default::default()
            },
        );

        let updated = TaskService::update_task(
            &mut conn,
            &created.task.id,
            TaskUpdateParams {
                title: Some("Renamed".to_string()),
                today_rank: Some(Some(2)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.task.today_rank, Some(2));
    }

    #[test]
    fn test_update_status_away_from_actionable_clears_rank() {
        let mut conn = setup_db();
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "Ranked".to_string(),
                status: Some(TaskStatus::Doing),
                today_rank: Some(1),
                ..Default::default()
            },
        );

        let updated = TaskService::update_task(
            &mut conn,
            &created.task.id,
            TaskUpdateParams {
                status: Some(TaskStatus::Waiting),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.task.status, TaskStatus::Waiting);
        assert!(updated.task.today_rank.is_none());
    }

    #[test]
    fn test_update_to_done_and_back_manages_done_at() {
        let mut conn = setup_db();
        let created = create(&mut conn, titled("Flip"));

        let done = TaskService::update_task(
            &mut conn,
            &created.task.id,
            TaskUpdateParams {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(done.task.done_at.is_some());

        let reopened = TaskService::update_task(
            &mut conn,
            &created.task.id,
            TaskUpdateParams {
                status: Some(TaskStatus::Next),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(reopened.task.done_at.is_none());
    }

    #[test]
    fn test_update_empty_tag_ids_clears_but_omitted_keeps() {
        let mut conn = setup_db();
        let tag = TagRepository::create_tag(&conn, "Work").unwrap();
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "Tagged".to_string(),
                tag_ids: Some(vec![tag.id]),
                ..Default::default()
            },
        );

        // Omitted tagIds: association untouched
        let updated = TaskService::update_task(
            &mut conn,
            &created.task.id,
            TaskUpdateParams {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.tags.len(), 1);

        // Explicit empty list: association cleared
        let cleared = TaskService::update_task(
            &mut conn,
            &created.task.id,
            TaskUpdateParams {
                tag_ids: Some(vec![]),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(cleared.tags.is_empty());
    }

    #[test]
    fn test_update_not_found() {
        let mut conn = setup_db();
        let result = TaskService::update_task(&mut conn, "task-missing", TaskUpdateParams::default());
        assert!(matches!(result, Err(TaskError::NotFound { .. })));
    }

    // --- Quick actions ---

    #[test]
    fn test_promote_inbox_task() {
        let mut conn = setup_db();
        let created = create(&mut conn, titled("Triage me"));
        let promoted = TaskService::promote_to_next(&mut conn, &created.task.id).unwrap();
        assert_eq!(promoted.task.status, TaskStatus::Next);
    }

    #[test]
    fn test_promote_non_inbox_fails_and_leaves_task_unchanged() {
        let mut conn = setup_db();
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "In flight".to_string(),
                status: Some(TaskStatus::Doing),
                ..Default::default()
            },
        );

        let result = TaskService::promote_to_next(&mut conn, &created.task.id);
        assert!(matches!(result, Err(TaskError::InvalidState(_))));
        let after = TaskService::get_task(&conn, &created.task.id).unwrap();
        assert_eq!(after.task.status, TaskStatus::Doing);
        assert_eq!(after.task.updated_at, created.task.updated_at);
    }

    #[test]
    fn test_complete_ranked_task_frees_slot() {
        let mut conn = setup_db();
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "Focus".to_string(),
                status: Some(TaskStatus::Doing),
                today_rank: Some(1),
                ..Default::default()
            },
        );

        let completed = TaskService::complete_task(&mut conn, &created.task.id).unwrap();
        assert_eq!(completed.task.status, TaskStatus::Done);
        assert!(completed.task.done_at.is_some());
        assert!(completed.task.today_rank.is_none());

        assert!(TaskService::list_today(&conn).unwrap().is_empty());
        let done = TaskService::list_done(&conn).unwrap();
        assert_eq!(done.len(), 1);
    }

    #[test]
    fn test_complete_already_done_fails() {
        let mut conn = setup_db();
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "Finished".to_string(),
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        );
        let result = TaskService::complete_task(&mut conn, &created.task.id);
        assert!(matches!(result, Err(TaskError::InvalidState(_))));
    }

    #[test]
    fn test_quick_actions_not_found() {
        let mut conn = setup_db();
        assert!(matches!(
            TaskService::promote_to_next(&mut conn, "task-missing"),
            Err(TaskError::NotFound { .. })
        ));
        assert!(matches!(
            TaskService::complete_task(&mut conn, "task-missing"),
            Err(TaskError::NotFound { .. })
        ));
    }

    // --- Deletion ---

    #[test]
    fn test_delete_task_then_get_not_found() {
        let mut conn = setup_db();
        let created = create(&mut conn, titled("Doomed"));
        assert!(TaskService::delete_task(&conn, &created.task.id).unwrap());
        assert!(matches!(
            TaskService::get_task(&conn, &created.task.id),
            Err(TaskError::NotFound { .. })
        ));
        assert!(!TaskService::delete_task(&conn, &created.task.id).unwrap());
    }

    #[test]
    fn test_delete_tagged_task_keeps_tag() {
        let mut conn = setup_db();
        let tag = TagRepository::create_tag(&conn, "Work").unwrap();
        let created = create(
            &mut conn,
            TaskCreateParams {
                title: "Tagged".to_string(),
                tag_ids: Some(vec![tag.id.clone()]),
                ..Default::default()
            },
        );

        assert!(TaskService::delete_task(&conn, &created.task.id).unwrap());
        assert!(TagRepository::get_tag(&conn, &tag.id).unwrap().is_some());
    }

    // --- Views ---

    #[test]
    fn test_views_membership() {
        let mut conn = setup_db();
        let capture = create(&mut conn, titled("Capture"));
        let ranked = create(
            &mut conn,
            TaskCreateParams {
                title: "Ranked".to_string(),
                status: Some(TaskStatus::Next),
                today_rank: Some(1),
                ..Default::default()
            },
        );
        let queued = create(
            &mut conn,
            TaskCreateParams {
                title: "Queued".to_string(),
                status: Some(TaskStatus::Waiting),
                ..Default::default()
            },
        );
        let finished = create(
            &mut conn,
            TaskCreateParams {
                title: "Finished".to_string(),
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        );

        let ids = |tasks: Vec<TaskWithTags>| -> Vec<String> {
            tasks.into_iter().map(|t| t.task.id).collect()
        };
        assert_eq!(ids(TaskService::list_inbox(&conn).unwrap()), vec![capture.task.id]);
        assert_eq!(ids(TaskService::list_today(&conn).unwrap()), vec![ranked.task.id.clone()]);
        assert_eq!(ids(TaskService::list_backlog(&conn).unwrap()), vec![queued.task.id]);
        assert_eq!(ids(TaskService::list_done(&conn).unwrap()), vec![finished.task.id]);
        assert_eq!(TaskService::list_all(&conn).unwrap().len(), 4);

        // A ranked task lives in Today, not Backlog
        assert!(!ids(TaskService::list_backlog(&conn).unwrap()).contains(&ranked.task.id));
    }

    #[test]
    fn test_today_view_capacity_and_order() {
        let mut conn = setup_db();
        for rank in [3, 1, 2] {
            create(
                &mut conn,
                TaskCreateParams {
                    title: format!("Slot {rank}"),
                    status: Some(TaskStatus::Next),
                    today_rank: Some(rank),
                    ..Default::default()
                },
            );
        }

        let today = TaskService::list_today(&conn).unwrap();
        assert_eq!(today.len(), 3);
        let ranks: Vec<Option<i32>> = today.iter().map(|t| t.task.today_rank).collect();
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_views_attach_tags() {
        let mut conn = setup_db();
        let tag = TagRepository::create_tag(&conn, "Work").unwrap();
        create(
            &mut conn,
            TaskCreateParams {
                title: "Tagged capture".to_string(),
                tag_ids: Some(vec![tag.id.clone()]),
                ..Default::default()
            },
        );

        let inbox = TaskService::list_inbox(&conn).unwrap();
        assert_eq!(inbox[0].tags.len(), 1);
        assert_eq!(inbox[0].tags[0].id, tag.id);
    }
}
