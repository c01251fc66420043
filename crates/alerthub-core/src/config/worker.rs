//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background job worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of concurrent job processing tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Capacity of the in-process job channel. Enqueue fails once full.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Finished jobs kept for status lookups.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Seconds to wait for in-flight jobs on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
    /// Cron expression (with seconds) for the monthly report.
    #[serde(default = "default_report_schedule")]
    pub report_schedule: String,
    /// Whether the scheduled report is mailed after generation.
    #[serde(default = "default_true")]
    pub report_send: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            concurrency: default_concurrency(),
            queue_capacity: default_queue_capacity(),
            history_limit: default_history_limit(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
            report_schedule: default_report_schedule(),
            report_send: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_history_limit() -> usize {
    500
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_report_schedule() -> String {
    // 06:00 on the first day of every month
    "0 0 6 1 * *".to_string()
}
