//! Health check handler.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use cronhands_scheduler::WorkerPool;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`, or `shutting_down` once shutdown was requested.
    pub status: String,
    /// Version information.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Task API requests served.
    pub requests: u64,
    /// Number of live dynamic tasks.
    pub jobs: usize,
    pub pool: PoolStatus,
}

/// Counters of the worker pool behind the task API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatus {
    pub size: usize,
    pub schedules: usize,
    pub active_firings: usize,
    pub idle_workers: usize,
    pub fired: u64,
    pub failed: u64,
}

impl PoolStatus {
    fn of(pool: &WorkerPool) -> Self {
        Self {
            size: pool.config().pool_size,
            schedules: pool.scheduled_count(),
            active_firings: pool.active_firings(),
            idle_workers: pool.available_workers(),
            fired: pool.total_fired(),
            failed: pool.total_failed(),
        }
    }
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pool = state.tasks.pool();
    let status = if state.is_shutdown_requested() || pool.is_shutdown() {
        "shutting_down"
    } else {
        "ok"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime().as_secs(),
        requests: state.request_count(),
        jobs: state.tasks.job_count(),
        pool: PoolStatus::of(pool),
    })
}
