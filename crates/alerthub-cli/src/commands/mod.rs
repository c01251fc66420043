//! CLI command definitions and dispatch.

pub mod alert;
pub mod migrate;
pub mod report;
pub mod serve;

use clap::{Parser, Subcommand};

use alerthub_core::config::AppConfig;
use alerthub_core::error::AppError;

use crate::output::OutputFormat;

/// AlertHub: alert fan-out and crime reporting
#[derive(Debug, Parser)]
#[command(name = "alerthub", version, about, long_about = None)]
pub struct Cli {
    /// Path to the base configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay (`config/{env}.toml`)
    #[arg(short, long, default_value = "development", env = "ALERTHUB_ENV")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the AlertHub server
    Serve(serve::ServeArgs),
    /// Monthly crime reports
    Report(report::ReportArgs),
    /// Alert dispatch and read tracking
    Alert(alert::AlertArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config, &self.env)?;
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Report(args) => report::execute(args, config, self.format).await,
            Commands::Alert(args) => alert::execute(args, config, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, config).await,
        }
    }
}
