//! Worker pool configuration.

use serde::{Deserialize, Serialize};

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of firings executing at the same time.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Tear down a cancelled schedule immediately instead of at its next fire time.
    #[serde(default = "default_remove_on_cancel")]
    pub remove_on_cancel: bool,

    /// Prefix used when naming worker slots in logs.
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,
}

fn default_pool_size() -> usize {
    5
}

fn default_remove_on_cancel() -> bool {
    true
}

fn default_thread_name_prefix() -> String {
    "task-scheduler-".to_string()
}

impl PoolConfig {
    /// Create a configuration with the given pool size and default settings.
    pub fn with_pool_size(pool_size: usize) -> Self {
        Self {
            pool_size,
            ..Default::default()
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            remove_on_cancel: default_remove_on_cancel(),
            thread_name_prefix: default_thread_name_prefix(),
        }
    }
}
