//! Task control errors.

use cronhands_scheduler::SchedulerError;
use thiserror::Error;

use crate::job::JobId;

/// Task control error types.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Missing or blank input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No live task with this id.
    #[error("Task not found: {0}")]
    NotFound(JobId),

    /// The worker pool rejected the schedule.
    #[error("Scheduling failed: {0}")]
    Scheduling(#[from] SchedulerError),

    /// The task could not be cancelled; it stays registered.
    #[error("Failed to cancel task: {0}")]
    CancellationFailed(JobId),

    /// Another live task already holds this id.
    #[error("Task already exists: {0}")]
    AlreadyExists(JobId),
}

impl TaskError {
    /// Whether this is the "not found" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TaskError::NotFound(_))
    }
}
