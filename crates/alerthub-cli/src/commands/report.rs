//! Monthly report CLI commands.

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use alerthub_api::Application;
use alerthub_core::config::AppConfig;
use alerthub_core::error::AppError;
use alerthub_entity::report::ReportPeriod;
use alerthub_report::{ReportRun, ReportStats};

use crate::output::{self, OutputFormat};

/// Arguments for report commands
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Report subcommand
    #[command(subcommand)]
    pub command: ReportCommand,
}

/// Report subcommands
#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Generate a monthly report (previous month by default)
    Generate {
        /// Month (1-12)
        #[arg(long)]
        month: Option<u32>,
        /// Year (requires --month)
        #[arg(long)]
        year: Option<i32>,
        /// Mail the report to opted-in users
        #[arg(long)]
        send: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct ShareRow {
    /// Category or status
    label: String,
    /// Reports
    count: u64,
    /// Share of the total
    share: String,
}

/// Execute report commands
pub async fn execute(
    args: &ReportArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ReportCommand::Generate { month, year, send } => {
            let period = ReportPeriod::resolve(*year, *month, Utc::now().date_naive())?;
            let app = Application::build(config).await?;
            let run = app.pipeline.run(period, *send).await;
            app.close();
            print_run(&run?, format);
        }
    }

    Ok(())
}

fn print_run(run: &ReportRun, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(run);
        return;
    }

    let document = &run.document;
    output::print_success(&format!("Generated {}", document.title));
    output::print_kv("Document", &document.path.display().to_string());
    output::print_kv("Total reports", &document.stats.total.to_string());
    if !document.omitted_charts.is_empty() {
        output::print_warning(&format!(
            "Charts omitted: {}",
            document.omitted_charts.join(", ")
        ));
    }

    println!();
    output::print_list(&share_rows(&document.stats), format);

    match &run.delivery {
        Some(tally) => {
            println!();
            output::print_kv("Emails attempted", &tally.attempted.to_string());
            output::print_kv("Emails delivered", &tally.delivered.to_string());
            output::print_kv("Emails failed", &tally.failed.to_string());
        }
        None => output::print_kv("Sent", "no"),
    }
}

fn share_rows(stats: &ReportStats) -> Vec<ShareRow> {
    stats
        .by_category
        .iter()
        .map(|row| ShareRow {
            label: row.label.clone(),
            count: row.count,
            share: stats.percentage(row.count),
        })
        .collect()
}
