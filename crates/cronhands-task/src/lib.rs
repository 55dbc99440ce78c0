//! # CronHands Task
//!
//! Runtime control of recurring cron jobs.
//!
//! ## Architecture
//! ```text
//! TaskControlService
//!   ├── start / start_with / start_with_id → WorkerPool::schedule → JobRegistry::insert
//!   ├── stop     → JobHandle::cancel → JobRegistry::remove (compare-and-remove)
//!   ├── restart  → stop + start_with_id (same id)
//!   └── query_all → JobRegistry::jobs (snapshot) → Job::describe
//! ```

pub mod action;
pub mod error;
pub mod job;
pub mod registry;
pub mod service;

pub use action::{JobAction, LogAction};
pub use error::TaskError;
pub use job::{generate_id, Job, JobId};
pub use registry::JobRegistry;
pub use service::{TaskControlService, DEFAULT_CRON_EXPRESSION};
