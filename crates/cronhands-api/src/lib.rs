//! # CronHands API
//!
//! HTTP command surface over the task control service.
//!
//! ```text
//! POST /task/start?cronExpression=<expr>          - start a task
//! GET  /task/queryAll                             - list live tasks
//! POST /task/stop?taskId=<id>                     - stop a task
//! POST /task/restart?taskId=<id>&cronExpression=  - restart a task
//! GET  /health                                    - liveness, job and pool counters
//! ```

pub mod error;
pub mod monitoring;
pub mod routes;
pub mod server;
pub mod state;
pub mod task;

pub use error::ApiError;
pub use routes::create_router;
pub use server::{InterfaceConfig, InterfaceServer};
pub use state::AppState;
