//! CronHands - dynamic cron task scheduler
//!
//! Main entry point for the CronHands CLI and server.

mod check;
mod cli;
mod server;
mod static_jobs;

use clap::Parser;
use tracing::{error, info};

use cronhands_config::ConfigLoader;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config_path();

    if let Some(Commands::Check { count }) = cli.command {
        let config = ConfigLoader::load(&config_path)?;
        let (report, valid) = check::check_config(&config, count);
        print!("{}", report);
        if !valid {
            std::process::exit(1);
        }
        return Ok(());
    }

    server::init_tracing()?;

    let mut config = match ConfigLoader::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };
    if config_path.exists() {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        info!("No config at {}, using defaults", config_path.display());
    }

    if let Some(Commands::Run { host, port }) = cli.command {
        if let Some(host) = host {
            config.server.host = host;
        }
        if let Some(port) = port {
            config.server.port = port;
        }
    }

    server::run_server(config).await
}
