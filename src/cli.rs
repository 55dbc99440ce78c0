//! CLI definitions for CronHands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cronhands_config::ConfigLoader;

/// CronHands CLI.
#[derive(Parser)]
#[command(name = "cronhands")]
#[command(about = "Dynamic cron task scheduler")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true, env = "CRONHANDS_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Configuration path with a leading `~` expanded.
    pub fn config_path(&self) -> PathBuf {
        PathBuf::from(ConfigLoader::expand_path(&self.config.to_string_lossy()))
    }
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the scheduler and HTTP server in foreground (default)
    Run {
        /// Server host, overrides the config file
        #[arg(long)]
        host: Option<String>,

        /// Server port, overrides the config file
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate the configuration and print upcoming fire times
    Check {
        /// Number of fire times to print per expression
        #[arg(long, default_value_t = 3)]
        count: usize,
    },
}
