//! Background job processing and scheduled tasks for AlertHub.
//!
//! This crate provides:
//! - A bounded in-process job queue implementing the core `TaskQueue`
//! - A worker runner executing queued jobs on a bounded pool
//! - A job executor that dispatches jobs to the correct handler
//! - Handlers for alert fan-out, SMS delivery and the monthly report
//! - A cron scheduler that queues the monthly report

pub mod executor;
pub mod jobs;
pub mod queue;
pub mod runner;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use queue::{JobQueue, QueueStats};
pub use runner::WorkerRunner;
pub use scheduler::CronScheduler;
