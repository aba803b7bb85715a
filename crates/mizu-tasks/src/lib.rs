//! Task tracking core: a personal task tracker backed by `SQLite`.
//!
//! Tasks move through a small lifecycle (`inbox` → `next`/`doing`/`waiting`
//! → `done`), can carry tags, and up to three of them hold a ranked spot in
//! the Today view. This crate owns the schema, the connection pool, the
//! status invariants, and the service layer; the HTTP surface lives in
//! `mizu-server`.
//!
//! # Architecture
//!
//! - [`types`] — domain types and mutation params
//! - [`db`] — `r2d2` connection pool with WAL/foreign-key pragmas
//! - [`migrations`] — idempotent schema DDL
//! - [`invariants`] — pure status-driven corrections on the write path
//! - [`repository`] — stateless SQL access
//! - [`service`] — transactional operations composing the above

pub mod db;
pub mod errors;
pub mod invariants;
pub mod migrations;
pub mod repository;
pub mod service;
pub mod types;

pub use db::{new_file, new_in_memory, ConnectionConfig, ConnectionPool, PooledConnection};
pub use errors::TaskError;
pub use invariants::apply_status_invariants;
pub use migrations::run_migrations;
pub use repository::{TagRepository, TaskRepository};
pub use service::TaskService;
pub use types::{
    Tag, Task, TaskCreateParams, TaskStatus, TaskUpdateParams, TaskWithTags,
};
