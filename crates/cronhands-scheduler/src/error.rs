//! Scheduler errors.

use thiserror::Error;

/// Boxed error returned by a failing firing.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Scheduler error types.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The expression does not parse.
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    /// The expression parses but never fires again.
    #[error("Cron expression '{0}' has no upcoming fire time")]
    NoUpcomingFireTime(String),

    /// The pool no longer accepts schedules.
    #[error("Scheduler is shut down")]
    Shutdown,

    /// Called outside of a tokio runtime.
    #[error("No tokio runtime available to drive the schedule")]
    NoRuntime,
}

impl SchedulerError {
    pub(crate) fn invalid(expression: &str, reason: impl Into<String>) -> Self {
        Self::InvalidExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

/// A single failed firing, handed to the pool's error handler.
#[derive(Debug, Clone)]
pub struct FiringFailure {
    /// Label of the schedule that failed.
    pub label: String,
    /// Error or panic message.
    pub message: String,
    /// Whether the firing panicked rather than returning an error.
    pub panicked: bool,
}
