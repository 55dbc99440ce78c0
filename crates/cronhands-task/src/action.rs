//! Work performed by a task on each firing.

use std::sync::Arc;

use async_trait::async_trait;
use cronhands_scheduler::{BoxError, Runnable};
use tracing::info;

use crate::job::JobId;

/// Action executed on every firing of a task.
#[async_trait]
pub trait JobAction: Send + Sync {
    /// Execute one firing of task `id`.
    async fn execute(&self, id: JobId, cron_expression: &str) -> Result<(), BoxError>;
}

/// Default action: log that the task is running.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAction;

#[async_trait]
impl JobAction for LogAction {
    async fn execute(&self, id: JobId, cron_expression: &str) -> Result<(), BoxError> {
        info!(
            task_id = id,
            "Task {} is running on schedule [{}]", id, cron_expression
        );
        Ok(())
    }
}

/// Binds an action to one task so the worker pool can run it.
pub(crate) struct ActionRunnable {
    pub(crate) id: JobId,
    pub(crate) cron_expression: String,
    pub(crate) action: Arc<dyn JobAction>,
}

#[async_trait]
impl Runnable for ActionRunnable {
    async fn run(&self) -> Result<(), BoxError> {
        self.action.execute(self.id, &self.cron_expression).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct RecordingAction {
        last_id: AtomicI64,
    }

    #[async_trait]
    impl JobAction for RecordingAction {
        async fn execute(&self, id: JobId, _cron_expression: &str) -> Result<(), BoxError> {
            self.last_id.store(id, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_log_action() {
        LogAction.execute(1, "0/5 * * * * ?").await.unwrap();
    }

    #[tokio::test]
    async fn test_action_runnable_passes_id() {
        let action = Arc::new(RecordingAction {
            last_id: AtomicI64::new(0),
        });
        let runnable = ActionRunnable {
            id: 99,
            cron_expression: "* * * * * ?".to_string(),
            action: action.clone(),
        };

        runnable.run().await.unwrap();
        assert_eq!(action.last_id.load(Ordering::SeqCst), 99);
    }
}
