//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::monitoring;
use crate::state::AppState;
use crate::task;

/// Create the router.
///
/// ```text
/// /task
///   POST   /task/start     - Start a task
///   GET    /task/queryAll  - List live tasks
///   POST   /task/stop      - Stop a task
///   POST   /task/restart   - Restart a task
///
/// /health  - Health check
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let task_routes = Router::new()
        .route("/start", post(task::start_task))
        .route("/queryAll", get(task::query_all_tasks))
        .route("/stop", post(task::stop_task))
        .route("/restart", post(task::restart_task))
        .with_state(state.clone());

    let monitoring_routes = Router::new()
        .route("/health", get(monitoring::health_check))
        .with_state(state);

    Router::new()
        .nest("/task", task_routes)
        .merge(monitoring_routes)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
