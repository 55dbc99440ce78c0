//! Application state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use cronhands_task::TaskControlService;
use tokio_util::sync::CancellationToken;

/// Application state shared across handlers.
pub struct AppState {
    pub tasks: Arc<TaskControlService>,
    start_time: Instant,
    request_count: AtomicU64,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(tasks: Arc<TaskControlService>) -> Self {
        Self {
            tasks,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
        }
    }

    /// Get uptime.
    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Get request count.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Increment request count.
    pub fn increment_requests(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Ask the server to stop accepting requests.
    pub fn request_shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Check if shutdown is requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Token cancelled by [`request_shutdown`](Self::request_shutdown).
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}
