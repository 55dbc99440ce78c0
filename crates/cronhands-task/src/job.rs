//! Job model.

use std::sync::Arc;

use chrono::{DateTime, Local};
use cronhands_scheduler::JobHandle;
use uuid::Uuid;

/// Job identifier.
pub type JobId = i64;

/// Generate a fresh, unpredictable job id from the low 64 bits of a v4 UUID.
pub fn generate_id() -> JobId {
    let (_, low) = Uuid::new_v4().as_u64_pair();
    low as JobId
}

/// A live recurring job.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    cron_expression: String,
    handle: Option<Arc<dyn JobHandle>>,
    started_at: DateTime<Local>,
}

impl Job {
    /// Create a job record.
    pub fn new(
        id: JobId,
        cron_expression: impl Into<String>,
        handle: Option<Arc<dyn JobHandle>>,
    ) -> Self {
        Self {
            id,
            cron_expression: cron_expression.into(),
            handle,
            started_at: Local::now(),
        }
    }

    /// Get the job ID.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Get the cron expression.
    pub fn cron_expression(&self) -> &str {
        &self.cron_expression
    }

    /// Get the handle to the live schedule, if any.
    pub fn handle(&self) -> Option<&Arc<dyn JobHandle>> {
        self.handle.as_ref()
    }

    /// When the job was started.
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// One-line summary as reported by `query_all`.
    pub fn describe(&self) -> String {
        format!(
            "taskId -> {}, cronExpression -> [{}]",
            self.id, self.cron_expression
        )
    }
}
