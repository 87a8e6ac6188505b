//! ReefGuard server.
//!
//! Serves the reef catalog with bearer-token authentication and role guards.
//! See [`config`] for how configuration is layered.

mod app;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// ReefGuard catalog server
#[derive(Parser, Debug)]
#[command(name = "reefguard-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long, global = true)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Commands {
    /// Start the HTTP server (default)
    Run,
    /// Load and validate the configuration, then exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Check => {
            config.validate()?;
            println!("Configuration OK");
            Ok(())
        }
        Commands::Run => {
            logging::init(&config.logging)?;
            config.validate()?;
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                bind_addr = %config.server.bind_addr,
                auth_mode = ?config.auth.mode,
                tokens = config.auth.tokens.len(),
                "Starting ReefGuard server"
            );
            app::serve(&config).await
        }
    }
}
