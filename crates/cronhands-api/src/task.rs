//! Task HTTP route handlers.
//!
//! - POST /task/start     - Start a task
//! - GET  /task/queryAll  - List live tasks
//! - POST /task/stop      - Stop a task
//! - POST /task/restart   - Restart a task
//!
//! Parameters travel in the query string. A missing or malformed `taskId`
//! is rejected with 400 before reaching the handler.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use cronhands_scheduler::SchedulerError;
use cronhands_task::{JobId, TaskError};
use serde::Deserialize;
use tracing::info;

use crate::state::AppState;

pub const START_SUCCEEDED: &str = "Task started successfully.";
pub const START_FAILED: &str = "Failed to start task.";
pub const STOP_SUCCEEDED: &str = "Task stopped successfully.";
pub const STOP_FAILED: &str = "Failed to stop task.";
pub const STOP_NOT_FOUND: &str = "No task exists with this id, try starting a new one.";
pub const RESTART_SUCCEEDED: &str = "Task restarted successfully.";
pub const RESTART_FAILED: &str = "Failed to restart task.";

/// Query for `POST /task/start`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuery {
    pub cron_expression: Option<String>,
}

/// Query for `POST /task/stop`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopQuery {
    pub task_id: JobId,
}

/// Query for `POST /task/restart`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestartQuery {
    pub task_id: JobId,
    pub cron_expression: Option<String>,
}

/// Treat a blank expression as absent.
fn non_blank(expression: Option<String>) -> Option<String> {
    expression.filter(|e| !e.trim().is_empty())
}

/// HTTP status reported for a failed task operation.
pub fn status_for(err: &TaskError) -> StatusCode {
    match err {
        TaskError::Validation(_) => StatusCode::BAD_REQUEST,
        TaskError::NotFound(_) => StatusCode::NOT_FOUND,
        TaskError::Scheduling(SchedulerError::Shutdown)
        | TaskError::Scheduling(SchedulerError::NoRuntime) => StatusCode::SERVICE_UNAVAILABLE,
        TaskError::Scheduling(_) => StatusCode::BAD_REQUEST,
        TaskError::CancellationFailed(_) | TaskError::AlreadyExists(_) => StatusCode::CONFLICT,
    }
}

/// Start a task.
///
/// POST /task/start
pub async fn start_task(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StartQuery>,
) -> impl IntoResponse {
    state.increment_requests();

    let result = match non_blank(query.cron_expression) {
        Some(expression) => state.tasks.start_with(&expression),
        None => state.tasks.start(),
    };

    match result {
        Ok(id) => {
            info!("Task {} started via API", id);
            (StatusCode::OK, START_SUCCEEDED)
        }
        Err(e) => (status_for(&e), START_FAILED),
    }
}

/// List every live task.
///
/// GET /task/queryAll
pub async fn query_all_tasks(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.increment_requests();
    Json(state.tasks.query_all())
}

/// Stop a task.
///
/// POST /task/stop
pub async fn stop_task(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StopQuery>,
) -> impl IntoResponse {
    state.increment_requests();

    match state.tasks.stop(query.task_id) {
        Ok(()) => (StatusCode::OK, STOP_SUCCEEDED),
        Err(e) if e.is_not_found() => (status_for(&e), STOP_NOT_FOUND),
        Err(e) => (status_for(&e), STOP_FAILED),
    }
}

/// Restart a task, optionally with a new expression.
///
/// POST /task/restart
pub async fn restart_task(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RestartQuery>,
) -> impl IntoResponse {
    state.increment_requests();

    let result = match non_blank(query.cron_expression) {
        Some(expression) => state.tasks.restart_with(query.task_id, &expression),
        None => state.tasks.restart(query.task_id),
    };

    match result {
        Ok(_) => (StatusCode::OK, RESTART_SUCCEEDED),
        Err(e) => (status_for(&e), RESTART_FAILED),
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
