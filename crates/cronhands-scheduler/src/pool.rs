//! Worker pool that drives cron schedules.
//!
//! Every schedule gets a lightweight driver that sleeps until the next fire
//! time, runs the firing on the pool and re-arms. Firings of all schedules
//! share `pool_size` permits; a firing that finds no free permit waits in
//! FIFO order, so the backlog is unbounded.

use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::PoolConfig;
use crate::cron::CronExpression;
use crate::error::{BoxError, FiringFailure, SchedulerError};
use crate::handle::ScheduledHandle;

/// Work executed on every firing.
#[async_trait]
pub trait Runnable: Send + Sync {
    /// Run one firing.
    async fn run(&self) -> Result<(), BoxError>;
}

/// [`Runnable`] backed by an async closure.
pub struct FnRunnable<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Runnable for FnRunnable<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn run(&self) -> Result<(), BoxError> {
        (self.f)().await
    }
}

/// Wrap an async closure as a shared [`Runnable`].
pub fn runnable_fn<F, Fut>(f: F) -> Arc<dyn Runnable>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    Arc::new(FnRunnable { f })
}

/// Hook invoked for every failed firing.
pub type ErrorHandler = Arc<dyn Fn(&FiringFailure) + Send + Sync>;

/// Error handler that logs the failure.
pub fn log_error_handler() -> ErrorHandler {
    Arc::new(|failure: &FiringFailure| {
        if failure.panicked {
            error!(
                "Scheduled task '{}' panicked: {}",
                failure.label, failure.message
            );
        } else {
            error!(
                "Scheduled task '{}' failed: {}",
                failure.label, failure.message
            );
        }
    })
}

#[derive(Default)]
struct PoolStats {
    scheduled: AtomicUsize,
    active: AtomicUsize,
    fired: AtomicU64,
    failed: AtomicU64,
}

/// Fixed-size pool executing cron-scheduled firings.
pub struct WorkerPool {
    config: PoolConfig,
    error_handler: ErrorHandler,
    semaphore: Arc<Semaphore>,
    shutdown: CancellationToken,
    stats: Arc<PoolStats>,
}

impl WorkerPool {
    /// Create a new worker pool that logs failed firings.
    pub fn new(config: PoolConfig) -> Self {
        let permits = config.pool_size.max(1);
        info!(
            "Worker pool created with {} workers (remove_on_cancel: {})",
            permits, config.remove_on_cancel
        );
        Self {
            config,
            error_handler: log_error_handler(),
            semaphore: Arc::new(Semaphore::new(permits)),
            shutdown: CancellationToken::new(),
            stats: Arc::new(PoolStats::default()),
        }
    }

    /// Replace the error handler.
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = handler;
        self
    }

    /// Get the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Schedule `runnable` to fire on every match of `expression`.
    ///
    /// Returns as soon as the first fire time is armed.
    ///
    /// # Errors
    ///
    /// Fails if the expression is invalid or never fires, if the pool was
    /// shut down, or if called outside of a tokio runtime.
    pub fn schedule(
        &self,
        label: impl Into<String>,
        runnable: Arc<dyn Runnable>,
        expression: &str,
    ) -> Result<ScheduledHandle, SchedulerError> {
        if self.is_shutdown() {
            return Err(SchedulerError::Shutdown);
        }

        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        let cron = CronExpression::parse(expression)?;
        let first = cron
            .next_fire_time()
            .ok_or_else(|| SchedulerError::NoUpcomingFireTime(cron.as_str().to_string()))?;

        let label = label.into();
        let handle = ScheduledHandle::new(
            label.clone(),
            self.shutdown.child_token(),
            self.shutdown.child_token(),
            self.config.remove_on_cancel,
        );

        debug!(
            "Schedule '{}' armed with [{}], first fire at {}",
            label,
            cron,
            first.to_rfc3339()
        );

        let driver = Driver {
            label,
            cron,
            runnable,
            handle: handle.clone(),
            semaphore: self.semaphore.clone(),
            error_handler: self.error_handler.clone(),
            stats: self.stats.clone(),
            worker_prefix: self.config.thread_name_prefix.clone(),
            pool_size: self.config.pool_size.max(1),
        };

        self.stats.scheduled.fetch_add(1, Ordering::SeqCst);
        runtime.spawn(driver.run(first));

        Ok(handle)
    }

    /// Number of schedules whose driver is still alive.
    pub fn scheduled_count(&self) -> usize {
        self.stats.scheduled.load(Ordering::SeqCst)
    }

    /// Number of firings executing right now.
    pub fn active_firings(&self) -> usize {
        self.stats.active.load(Ordering::SeqCst)
    }

    /// Total firings started since creation.
    pub fn total_fired(&self) -> u64 {
        self.stats.fired.load(Ordering::SeqCst)
    }

    /// Total firings that returned an error or panicked.
    pub fn total_failed(&self) -> u64 {
        self.stats.failed.load(Ordering::SeqCst)
    }

    /// Number of idle workers.
    pub fn available_workers(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Whether the pool was shut down.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Stop every schedule, abort running firings and reject new schedules.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            self.shutdown.cancel();
            info!("Worker pool stopped");
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Decrements the live schedule count when the driver exits.
struct ScheduledGuard(Arc<PoolStats>);

impl Drop for ScheduledGuard {
    fn drop(&mut self) {
        self.0.scheduled.fetch_sub(1, Ordering::SeqCst);
    }
}

struct Driver {
    label: String,
    cron: CronExpression,
    runnable: Arc<dyn Runnable>,
    handle: ScheduledHandle,
    semaphore: Arc<Semaphore>,
    error_handler: ErrorHandler,
    stats: Arc<PoolStats>,
    worker_prefix: String,
    pool_size: usize,
}

impl Driver {
    async fn run(self, first: DateTime<Local>) {
        let _guard = ScheduledGuard(self.stats.clone());
        let mut next = first;

        loop {
            let delay = (next - Local::now()).to_std().unwrap_or_default();
            tokio::select! {
                _ = self.handle.stopped() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            if self.handle.should_stop() {
                break;
            }
            // Long sleeps are clamped by the timer wheel; wait out the rest.
            if Local::now() < next {
                continue;
            }

            self.fire().await;
            if self.handle.should_stop() {
                break;
            }

            // Never before the fire time just served, so a firing is not repeated.
            let now = Local::now();
            let after = if now > next { now } else { next };
            match self.cron.next_after(&after) {
                Some(time) => next = time,
                None => {
                    debug!("Schedule '{}' has no further fire times", self.label);
                    break;
                }
            }
        }

        self.handle.complete();
        debug!("Driver for '{}' exited", self.label);
    }

    async fn fire(&self) {
        let permit = tokio::select! {
            permit = self.semaphore.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return,
            },
            _ = self.handle.stopped() => return,
            _ = self.handle.interrupted() => return,
        };
        if self.handle.should_stop() {
            return;
        }

        let slot = self.pool_size - self.semaphore.available_permits();
        debug!("{}{} firing '{}'", self.worker_prefix, slot, self.label);

        self.stats.active.fetch_add(1, Ordering::SeqCst);
        self.stats.fired.fetch_add(1, Ordering::SeqCst);

        let runnable = self.runnable.clone();
        let mut task = tokio::spawn(async move { runnable.run().await });
        let outcome = tokio::select! {
            joined = &mut task => Some(joined),
            _ = self.handle.interrupted() => {
                task.abort();
                None
            }
        };

        self.stats.active.fetch_sub(1, Ordering::SeqCst);
        drop(permit);

        match outcome {
            Some(Ok(Ok(()))) => {}
            Some(Ok(Err(e))) => self.report(e.to_string(), false),
            Some(Err(join_error)) if join_error.is_panic() => {
                self.report(panic_message(join_error.into_panic()), true)
            }
            Some(Err(_)) | None => {
                debug!("Firing of '{}' interrupted", self.label);
            }
        }
    }

    fn report(&self, message: String, panicked: bool) {
        self.stats.failed.fetch_add(1, Ordering::SeqCst);
        let failure = FiringFailure {
            label: self.label.clone(),
            message,
            panicked,
        };
        (self.error_handler)(&failure);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
