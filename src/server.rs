//! Server initialization and startup logic for CronHands.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cronhands_api::{AppState, InterfaceConfig, InterfaceServer};
use cronhands_config::{Config, ConfigLoader, ConfigValidator};
use cronhands_scheduler::{CronExpression, PoolConfig, SchedulerError, WorkerPool};
use cronhands_task::{JobRegistry, TaskControlService};

use crate::static_jobs::StaticJobs;

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.cronhands/logs/ with daily rotation.
pub(crate) fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = ConfigLoader::home_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("cronhands")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the background writer alive for the whole process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Pool configuration for the dynamic task API.
fn pool_config(config: &Config) -> PoolConfig {
    PoolConfig {
        pool_size: config.scheduler.pool_size,
        remove_on_cancel: config.scheduler.remove_on_cancel,
        thread_name_prefix: config.scheduler.thread_name_prefix.clone(),
    }
}

/// Parse the default expression so a broken one fails startup instead of
/// every `POST /task/start` without an expression.
fn check_default_expression(config: &Config) -> Result<CronExpression, SchedulerError> {
    CronExpression::parse(&config.scheduler.default_cron_expression)
}

/// Build the task control service from configuration.
pub(crate) fn build_task_service(config: &Config) -> (Arc<WorkerPool>, Arc<TaskControlService>) {
    let pool = Arc::new(WorkerPool::new(pool_config(config)));
    let tasks = TaskControlService::new(pool.clone(), Arc::new(JobRegistry::new()))
        .with_default_cron_expression(config.scheduler.default_cron_expression.clone());
    (pool, Arc::new(tasks))
}

/// Run the scheduler and HTTP server until Ctrl-C.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting CronHands v{}", env!("CARGO_PKG_VERSION"));

    for warning in ConfigValidator::validate(&config)?.into_result()? {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    let default_cron = check_default_expression(&config)?;
    info!("Default cron expression: [{}]", default_cron);

    let static_jobs = StaticJobs::start(&config.static_scheduler)?;
    let (pool, tasks) = build_task_service(&config);

    let state = Arc::new(AppState::new(tasks.clone()));
    let signal_state = state.clone();
    let interface_config = InterfaceConfig::new(&config.server.host, config.server.port);
    let server = InterfaceServer::new(interface_config, state);

    info!("CronHands ready:");
    info!("  API Server:    http://{}", server.addr());
    info!("  Static jobs:   {}", static_jobs.len());
    info!("API Endpoints:");
    info!("  POST /task/start?cronExpression=        - start a task");
    info!("  GET  /task/queryAll                     - list tasks");
    info!("  POST /task/stop?taskId=                 - stop a task");
    info!("  POST /task/restart?taskId=&cronExpression= - restart a task");
    info!("  GET  /health                            - health check");

    let result = server
        .run_until(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
            signal_state.request_shutdown();
        })
        .await;

    info!("Shutting down...");
    tasks.shutdown();
    pool.shutdown();
    static_jobs.shutdown();

    result?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_from_config() {
        let mut config = Config::default();
        config.scheduler.pool_size = 7;
        config.scheduler.remove_on_cancel = false;

        let pool = pool_config(&config);
        assert_eq!(pool.pool_size, 7);
        assert!(!pool.remove_on_cancel);
        assert_eq!(pool.thread_name_prefix, "task-scheduler-");
    }

    #[test]
    fn test_check_default_expression() {
        let config = Config::default();
        assert_eq!(
            check_default_expression(&config).unwrap().as_str(),
            "0/5 * * * * ?"
        );
    }

    #[test]
    fn test_check_default_expression_rejects_out_of_range() {
        let mut config = Config::default();
        config.scheduler.default_cron_expression = "99 * * * * ?".to_string();

        // Field count alone passes validation.
        assert!(ConfigValidator::validate(&config).unwrap().is_valid());
        assert!(matches!(
            check_default_expression(&config),
            Err(SchedulerError::InvalidExpression { .. })
        ));
    }

    #[tokio::test]
    async fn test_build_task_service_uses_default_expression() {
        let mut config = Config::default();
        config.scheduler.default_cron_expression = "0 0 0 1 1 ? 2099".to_string();

        let (pool, tasks) = build_task_service(&config);
        assert_eq!(tasks.default_cron_expression(), "0 0 0 1 1 ? 2099");

        let id = tasks.start().unwrap();
        assert_eq!(tasks.query_all().len(), 1);
        assert_eq!(pool.scheduled_count(), 1);

        tasks.stop(id).unwrap();
        pool.shutdown();
    }
}
