//! Shared state accessible from Axum handlers.

use std::time::Instant;

use mizu_tasks::{ConnectionPool, PooledConnection};

use crate::error::ApiError;

/// Application state: the connection pool plus server metadata.
#[derive(Clone)]
pub struct AppState {
    /// `SQLite` connection pool.
    pub pool: ConnectionPool,
    /// When the server started.
    pub start_time: Instant,
}

impl AppState {
    /// Create state around an already-migrated pool.
    #[must_use]
    pub fn new(pool: ConnectionPool) -> Self {
        Self {
            pool,
            start_time: Instant::now(),
        }
    }

    /// Check out a connection from the pool.
    pub fn conn(&self) -> Result<PooledConnection, ApiError> {
        Ok(self.pool.get()?)
    }
}
