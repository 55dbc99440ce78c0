//! Fixed jobs armed at startup from `[static_scheduler]`.

use std::sync::Arc;

use cronhands_config::{StaticJobConfig, StaticSchedulerConfig};
use cronhands_scheduler::{
    runnable_fn, BoxError, JobHandle, PoolConfig, ScheduledHandle, SchedulerError, WorkerPool,
};
use tracing::info;

/// Static jobs and the pool that runs them.
pub(crate) struct StaticJobs {
    pool: Arc<WorkerPool>,
    handles: Vec<ScheduledHandle>,
}

impl StaticJobs {
    /// Arm every configured job on a dedicated pool.
    ///
    /// Stops at the first job whose expression is rejected.
    pub(crate) fn start(config: &StaticSchedulerConfig) -> Result<Self, SchedulerError> {
        let pool = Arc::new(WorkerPool::new(PoolConfig {
            pool_size: config.pool_size,
            thread_name_prefix: "static-scheduler-".to_string(),
            ..Default::default()
        }));

        let mut handles = Vec::with_capacity(config.jobs.len());
        for job in &config.jobs {
            match schedule_job(&pool, job) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    pool.shutdown();
                    return Err(e);
                }
            }
        }

        if !handles.is_empty() {
            info!("{} static job(s) scheduled", handles.len());
        }
        Ok(Self { pool, handles })
    }

    /// Number of armed static jobs.
    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Cancel every static job and stop the pool.
    pub(crate) fn shutdown(&self) {
        for handle in &self.handles {
            handle.cancel(true);
        }
        self.pool.shutdown();
    }
}

fn schedule_job(pool: &WorkerPool, job: &StaticJobConfig) -> Result<ScheduledHandle, SchedulerError> {
    let name = job.name.clone();
    let message = job.message().to_string();
    let runnable = runnable_fn(move || {
        let name = name.clone();
        let message = message.clone();
        async move {
            info!(job = %name, "{}", message);
            Ok::<(), BoxError>(())
        }
    });

    let handle = pool.schedule(job.name.clone(), runnable, &job.cron_expression)?;
    info!(
        "Static job '{}' scheduled with cron expression [{}]",
        job.name, job.cron_expression
    );
    Ok(handle)
}
