//! Task control service: start, stop, restart and query recurring tasks.
//!
//! Every operation validates its input, logs failures and returns a typed
//! result. `stop` distinguishes three outcomes: stopped (`Ok`), not found
//! ([`TaskError::NotFound`]) and failed to stop ([`TaskError::CancellationFailed`]).

use std::sync::Arc;

use chrono::Local;
use cronhands_scheduler::{JobHandle, WorkerPool};
use tracing::{error, info, warn};

use crate::action::{ActionRunnable, JobAction, LogAction};
use crate::error::TaskError;
use crate::job::{generate_id, Job, JobId};
use crate::registry::JobRegistry;

/// Expression used by [`TaskControlService::start`]: every 5 seconds.
pub const DEFAULT_CRON_EXPRESSION: &str = "0/5 * * * * ?";

/// Orchestrates the job registry and the worker pool.
pub struct TaskControlService {
    pool: Arc<WorkerPool>,
    registry: Arc<JobRegistry>,
    action: Arc<dyn JobAction>,
    default_cron_expression: String,
}

impl TaskControlService {
    /// Create a service whose tasks log on every firing.
    pub fn new(pool: Arc<WorkerPool>, registry: Arc<JobRegistry>) -> Self {
        Self {
            pool,
            registry,
            action: Arc::new(LogAction),
            default_cron_expression: DEFAULT_CRON_EXPRESSION.to_string(),
        }
    }

    /// Set the action executed on every firing.
    pub fn with_action(mut self, action: Arc<dyn JobAction>) -> Self {
        self.action = action;
        self
    }

    /// Set the expression used by [`start`](Self::start) and as restart fallback.
    pub fn with_default_cron_expression(mut self, expression: impl Into<String>) -> Self {
        self.default_cron_expression = expression.into();
        self
    }

    /// Get the job registry.
    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Get the worker pool running the tasks.
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Get the default cron expression.
    pub fn default_cron_expression(&self) -> &str {
        &self.default_cron_expression
    }

    /// Number of live tasks.
    pub fn job_count(&self) -> usize {
        self.registry.len()
    }

    /// Start a task on the default expression.
    pub fn start(&self) -> Result<JobId, TaskError> {
        self.start_with(&self.default_cron_expression)
    }

    /// Start a task on `cron_expression` under a freshly generated id.
    pub fn start_with(&self, cron_expression: &str) -> Result<JobId, TaskError> {
        if cron_expression.trim().is_empty() {
            error!("Failed to start task: cron expression is empty");
            return Err(TaskError::Validation("cron expression is empty".to_string()));
        }

        self.schedule(self.generate_id(), cron_expression)
    }

    /// Start a task on `cron_expression` under the given id.
    pub fn start_with_id(&self, id: JobId, cron_expression: &str) -> Result<JobId, TaskError> {
        if cron_expression.trim().is_empty() {
            error!("Failed to start task {}: cron expression is empty", id);
            return Err(TaskError::Validation("cron expression is empty".to_string()));
        }

        self.schedule(id, cron_expression)
    }

    fn schedule(&self, id: JobId, cron_expression: &str) -> Result<JobId, TaskError> {
        let runnable = Arc::new(ActionRunnable {
            id,
            cron_expression: cron_expression.to_string(),
            action: self.action.clone(),
        });

        let handle = self
            .pool
            .schedule(format!("task-{}", id), runnable, cron_expression)
            .map_err(|e| {
                error!("Failed to start task {}: {}", id, e);
                TaskError::from(e)
            })?;

        let handle: Arc<dyn JobHandle> = Arc::new(handle);
        let job = Arc::new(Job::new(id, cron_expression, Some(handle.clone())));
        if !self.registry.insert(job) {
            handle.cancel(true);
            warn!("Task {} is already running, discarding the new schedule", id);
            return Err(TaskError::AlreadyExists(id));
        }

        info!("Task {} started with cron expression [{}]", id, cron_expression);
        Ok(id)
    }

    /// Describe every live task as `taskId -> <id>, cronExpression -> [<expr>]`.
    pub fn query_all(&self) -> Vec<String> {
        self.registry.jobs().iter().map(|job| job.describe()).collect()
    }

    /// Stop a task.
    ///
    /// The entry is removed only after cancellation succeeded and only if it
    /// was not replaced in the meantime.
    pub fn stop(&self, id: JobId) -> Result<(), TaskError> {
        if self.registry.is_empty() {
            warn!("Cannot stop task {}: no tasks are running", id);
            return Err(TaskError::NotFound(id));
        }

        let job = self.registry.get(id).ok_or_else(|| {
            warn!("Cannot stop task {}: not found", id);
            TaskError::NotFound(id)
        })?;

        let Some(handle) = job.handle() else {
            error!("Cannot stop task {}: it has no schedule handle", id);
            return Err(TaskError::CancellationFailed(id));
        };

        if !handle.cancel(true) {
            warn!("Task {} could not be cancelled", id);
            return Err(TaskError::CancellationFailed(id));
        }

        if self.registry.remove(id, &job) {
            let ran_for = Local::now() - job.started_at();
            info!("Task {} stopped after {}s", id, ran_for.num_seconds());
            Ok(())
        } else {
            warn!("Task {} was cancelled but replaced before removal", id);
            Err(TaskError::CancellationFailed(id))
        }
    }

    /// Restart a task with its current expression.
    ///
    /// Falls back to the default expression when the id is unknown; the
    /// restart then fails at the stop step with [`TaskError::NotFound`].
    pub fn restart(&self, id: JobId) -> Result<JobId, TaskError> {
        let cron_expression = self
            .registry
            .get(id)
            .map(|job| job.cron_expression().to_string())
            .unwrap_or_else(|| self.default_cron_expression.clone());

        self.restart_with(id, &cron_expression)
    }

    /// Stop a task and start it again under the same id with `cron_expression`.
    ///
    /// Not atomic: a failure after the stop leaves the task stopped.
    pub fn restart_with(&self, id: JobId, cron_expression: &str) -> Result<JobId, TaskError> {
        if cron_expression.trim().is_empty() {
            error!("Failed to restart task {}: cron expression is empty", id);
            return Err(TaskError::Validation("cron expression is empty".to_string()));
        }

        if let Err(e) = self.stop(id) {
            if e.is_not_found() {
                warn!("Cannot restart task {}: not found, start a new task instead", id);
            } else {
                warn!("Cannot restart task {}: stop failed", id);
            }
            return Err(e);
        }

        match self.start_with_id(id, cron_expression) {
            Ok(id) => {
                info!("Task {} restarted with cron expression [{}]", id, cron_expression);
                Ok(id)
            }
            Err(e) => {
                error!("Task {} was stopped but failed to restart: {}", id, e);
                Err(e)
            }
        }
    }

    /// Generate a fresh task id.
    pub fn generate_id(&self) -> JobId {
        generate_id()
    }

    /// Cancel and remove every live task.
    pub fn shutdown(&self) {
        let jobs = self.registry.drain();
        let count = jobs.len();
        for job in jobs {
            if let Some(handle) = job.handle() {
                handle.cancel(true);
            }
        }
        info!("Task control service stopped {} task(s)", count);
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
