//! Diagnostic command line interface
//!
//! Opens the configured sites of one owner and inspects or edits their
//! points.
//!
//! ```text
//! docsite --config lobby.toml sites
//! docsite count local players
//! docsite put local players alice '{"name":"Alice"}'
//! docsite get local players alice
//! ```

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{ConfigurationLoader, EnvironmentLoader};
use crate::manager::StorageManager;
use crate::observability::init_tracing;
use crate::storage::StorageRegistries;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "docsite", version, about = "Inspect document storage sites")]
pub struct Cli {
    /// Configuration file (defaults to $DOCSITE_CONFIG, then docsite.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// .env file to load before reading the configuration
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Log filter; takes precedence over RUST_LOG and $DOCSITE_LOG
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List sites and their points
    Sites,
    /// Count documents in a point
    Count { site: String, point: String },
    /// Print one document
    Get {
        site: String,
        point: String,
        identifier: String,
    },
    /// Store a JSON object under an identifier
    Put {
        site: String,
        point: String,
        identifier: String,
        json: String,
    },
    /// Print every document of a point
    Dump { site: String, point: String },
}

/// Parse arguments, open storage, run the command, shut down.
pub async fn run() -> Result<()> {
    run_with(Cli::parse()).await
}

/// Run already-parsed arguments
pub async fn run_with(cli: Cli) -> Result<()> {
    let env = EnvironmentLoader::new(cli.env_file.as_deref());
    let config_path = cli.config.clone().or_else(|| env.config_path());
    let loader = ConfigurationLoader::new(config_path.as_deref())?;

    let level = cli.log_level.clone().or_else(|| env.log_level());
    init_tracing(&loader.config.logging, level.as_deref());

    let manager = StorageManager::open(&loader.config, Arc::new(StorageRegistries::new())).await?;
    let outcome = commands::execute(&manager, &cli.command).await;
    manager.shutdown().await?;
    outcome
}
