//! Zero DB restore tool
//!
//! Restores a SQL Server database from a versioned repository of baseline
//! backups, in one-shot command mode or through an interactive menu.

// zerodbtool/src/main.rs
mod backup;
mod cli;
mod config;
mod db;
mod errors;
mod menu;
mod repository;
mod sql;
mod workflow;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::{AppConfig, DEFAULT_CONFIG_PATH};
use db::{Connector, TdsConnector};
use menu::InteractiveMenu;
use workflow::{RestoreOutcome, Workflow};

/// Main entry point for the restore tool
#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run_app().await {
        Ok(_) => {
            println!("✅ Operation completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run_app() -> Result<()> {
    // No arguments at all means interactive mode against ./config.json.
    if env::args_os().len() <= 1 {
        return run_interactive().await;
    }

    let cli = Cli::parse();
    if let Err(usage) = cli.required_db_version() {
        usage.exit();
    }
    run_command_mode(&cli, &TdsConnector).await
}

/// One-shot mode: restore the version given with `-v`, optionally followed by the upgrade script.
async fn run_command_mode<C: Connector>(cli: &Cli, connector: &C) -> Result<()> {
    let db_version = cli.required_db_version()?;
    let app_config = load_config(&cli.config)?;
    let outcome = Workflow::new(&app_config, connector)
        .restore(db_version, cli.upgrade)
        .await
        .with_context(|| format!("Restoring {} to version {} failed", app_config.database_name, db_version))?;

    println!("{}", outcome.summary(&app_config.database_name));
    if let RestoreOutcome::VersionNotFound(version) = outcome {
        anyhow::bail!("Version {} is not in the Zero DB repository", version);
    }
    Ok(())
}

async fn run_interactive() -> Result<()> {
    let config_path = std::path::PathBuf::from(DEFAULT_CONFIG_PATH);
    let app_config = load_config(&config_path)?;

    let stdin = io::stdin();
    InteractiveMenu::new(config_path, app_config, TdsConnector, stdin.lock(), io::stdout())
        .run()
        .await
}

fn load_config(config_path: &std::path::Path) -> Result<AppConfig> {
    let app_config = AppConfig::load_from_json(config_path).with_context(|| {
        format!("Failed to load application configuration from {}", config_path.display())
    })?;
    print!("{}", app_config.describe());
    Ok(app_config)
}
