//! # CronHands Scheduler
//!
//! Cron expression engine and timer-driven worker pool.
//!
//! ## Features
//!
//! - Second-granularity cron expressions (6 or 7 fields)
//! - Fixed-size worker pool shared by every schedule
//! - Cancellable handles with optional interruption of the running firing
//! - Per-firing failure isolation through an error handler hook

pub mod config;
pub mod cron;
pub mod error;
pub mod handle;
pub mod pool;

pub use config::PoolConfig;
pub use cron::CronExpression;
pub use error::{BoxError, FiringFailure, SchedulerError};
pub use handle::{JobHandle, ScheduledHandle};
pub use pool::{log_error_handler, runnable_fn, ErrorHandler, FnRunnable, Runnable, WorkerPool};
