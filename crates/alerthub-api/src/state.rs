//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use alerthub_core::config::AppConfig;
use alerthub_dispatch::{AlertDispatchService, CrimeAlertNotifier};
use alerthub_realtime::BroadcastBus;
use alerthub_worker::JobQueue;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Alert dispatch service
    pub dispatch: Arc<AlertDispatchService>,
    /// Crime report write path
    pub crimes: Arc<CrimeAlertNotifier>,
    /// Job queue, for report jobs and status lookups
    pub queue: Arc<JobQueue>,
    /// WebSocket broadcast bus
    pub bus: Arc<BroadcastBus>,
    /// When the server started
    pub started_at: Instant,
}
