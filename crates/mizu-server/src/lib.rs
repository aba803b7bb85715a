//! HTTP surface for the mizu task tracker.
//!
//! A thin Axum layer over `mizu-tasks`: handlers validate the payload,
//! check out a pooled connection, and delegate to the service layer.
//! Responses are JSON with `camelCase` fields; errors come back as
//! `{"error": "..."}` with the status codes mapped in [`error`].

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        // Tasks
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/tasks/{id}/promote", post(routes::tasks::promote_task))
        .route("/tasks/{id}/complete", post(routes::tasks::complete_task))
        // Tags
        .route(
            "/tags",
            get(routes::tags::list_tags).post(routes::tags::create_tag),
        )
        .route(
            "/tags/{id}",
            get(routes::tags::get_tag).delete(routes::tags::delete_tag),
        )
        // Views
        .route("/views/inbox", get(routes::views::inbox))
        .route("/views/today", get(routes::views::today))
        .route("/views/backlog", get(routes::views::backlog))
        .route("/views/done", get(routes::views::done))
        // Local-first tool; the UI is served from another origin in dev
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let bind = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
