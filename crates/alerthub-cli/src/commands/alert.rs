//! Alert CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tokio::sync::watch;
use uuid::Uuid;

use alerthub_api::Application;
use alerthub_core::config::AppConfig;
use alerthub_core::error::AppError;
use alerthub_dispatch::DispatchSummary;
use alerthub_entity::job::JobStatus;

use crate::output::{self, OutputFormat};

/// Arguments for alert commands
#[derive(Debug, Args)]
pub struct AlertArgs {
    /// Alert subcommand
    #[command(subcommand)]
    pub command: AlertCommand,
}

/// Alert subcommands
#[derive(Debug, Subcommand)]
pub enum AlertCommand {
    /// Deliver an approved alert and wait for the fan-out to finish
    Dispatch {
        /// Alert ID
        alert_id: Uuid,
    },
    /// Show a user's unread alert count
    Unread {
        /// User ID
        user_id: Uuid,
    },
    /// Record that a user opened an alert
    View {
        /// Alert ID
        alert_id: Uuid,
        /// User ID
        user_id: Uuid,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct ChannelRow {
    /// Channel
    channel: &'static str,
    /// Attempted
    attempted: u64,
    /// Delivered
    delivered: u64,
    /// Already delivered earlier
    skipped: u64,
    /// Failed
    failed: u64,
}

/// Execute alert commands
pub async fn execute(
    args: &AlertArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let app = Application::build(config).await?;
    let result = run(&app, &args.command, format).await;
    app.close();
    result
}

async fn run(app: &Application, command: &AlertCommand, format: OutputFormat) -> Result<(), AppError> {
    match command {
        AlertCommand::Dispatch { alert_id } => {
            let ack = app.dispatch.dispatch(*alert_id).await?;
            output::print_kv("Fan-out job", &ack.job_id.to_string());
            output::print_kv("Candidates", &ack.total_candidates.to_string());

            let (cancel_tx, cancel_rx) = watch::channel(false);
            let worker = app.spawn_worker(cancel_rx);
            let job = app.queue.wait(ack.job_id).await;
            app.queue.wait_idle().await;
            let _ = cancel_tx.send(true);
            let _ = worker.await;
            let job = job?;

            if job.status == JobStatus::Failed {
                return Err(AppError::internal(format!(
                    "Fan-out failed: {}",
                    job.error_message.unwrap_or_default()
                )));
            }
            let summary: DispatchSummary = serde_json::from_value(job.result.unwrap_or_default())?;
            print_summary(&summary, format);
        }
        AlertCommand::Unread { user_id } => {
            let count = app.dispatch.unread_count(*user_id).await?;
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({ "count": count })),
                OutputFormat::Table => output::print_kv("Unread alerts", &count.to_string()),
            }
        }
        AlertCommand::View { alert_id, user_id } => {
            if app.dispatch.mark_viewed(*alert_id, *user_id).await? {
                output::print_success("View recorded.");
            } else {
                output::print_warning("Alert was already viewed by this user.");
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &DispatchSummary, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(summary);
        return;
    }

    output::print_success(&format!(
        "Alert sent to {} users",
        summary.total_candidates
    ));
    let rows = [
        ChannelRow {
            channel: "email",
            attempted: summary.email.attempted,
            delivered: summary.email.delivered,
            skipped: summary.email.skipped,
            failed: summary.email.failed,
        },
        ChannelRow {
            channel: "sms",
            attempted: summary.sms.attempted,
            delivered: summary.sms.delivered,
            skipped: summary.sms.skipped,
            failed: summary.sms.failed,
        },
    ];
    output::print_list(&rows, format);
}
