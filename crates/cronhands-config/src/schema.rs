//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Pool behind the dynamic task API.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Fixed jobs armed at startup on their own pool.
    #[serde(default)]
    pub static_scheduler: StaticSchedulerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Dynamic scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of firings that may run at once.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Drop a cancelled schedule immediately instead of at its next fire time.
    #[serde(default = "default_remove_on_cancel")]
    pub remove_on_cancel: bool,

    /// Expression used when a start request carries none.
    #[serde(default = "default_cron_expression")]
    pub default_cron_expression: String,

    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            remove_on_cancel: default_remove_on_cancel(),
            default_cron_expression: default_cron_expression(),
            thread_name_prefix: default_thread_name_prefix(),
        }
    }
}

fn default_pool_size() -> usize {
    5
}

fn default_remove_on_cancel() -> bool {
    true
}

fn default_cron_expression() -> String {
    "0/5 * * * * ?".to_string()
}

fn default_thread_name_prefix() -> String {
    "task-scheduler-".to_string()
}

/// Static scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticSchedulerConfig {
    #[serde(default = "default_static_pool_size")]
    pub pool_size: usize,

    #[serde(default)]
    pub jobs: Vec<StaticJobConfig>,
}

impl Default for StaticSchedulerConfig {
    fn default() -> Self {
        Self {
            pool_size: default_static_pool_size(),
            jobs: Vec::new(),
        }
    }
}

fn default_static_pool_size() -> usize {
    2
}

/// A fixed job that runs for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticJobConfig {
    pub name: String,

    pub cron_expression: String,

    /// Logged on every firing. Defaults to the job name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StaticJobConfig {
    /// Message logged on every firing.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(&self.name)
    }
}
