//! Application builder: wires stores, providers, worker, bus and router.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use alerthub_core::config::AppConfig;
use alerthub_core::error::AppError;
use alerthub_core::events::EventPublisher;
use alerthub_core::result::AppResult;
use alerthub_core::traits::TaskQueue;
use alerthub_database::Stores;
use alerthub_dispatch::provider::{build_email_provider, build_sms_provider};
use alerthub_dispatch::{
    AlertDispatchService, CrimeAlertNotifier, EligibilityResolver, EmailDispatcher, EmailProvider,
    SmsDispatcher, SmsProvider,
};
use alerthub_realtime::{BroadcastBus, EventBridge};
use alerthub_report::{ReportDistributor, ReportPipeline};
use alerthub_worker::jobs::{AlertFanoutHandler, MonthlyReportHandler, SmsDeliveryHandler};
use alerthub_worker::{CronScheduler, JobExecutor, JobQueue, WorkerRunner};

use crate::router::build_router;
use crate::state::AppState;

/// Every long-lived component of a running AlertHub instance.
#[derive(Debug)]
pub struct Application {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Persistence handles
    pub stores: Stores,
    /// In-process job queue
    pub queue: Arc<JobQueue>,
    /// Job handlers by type
    pub executor: Arc<JobExecutor>,
    /// Alert dispatch service
    pub dispatch: Arc<AlertDispatchService>,
    /// Crime report write path
    pub crimes: Arc<CrimeAlertNotifier>,
    /// Monthly report pipeline
    pub pipeline: Arc<ReportPipeline>,
    /// WebSocket broadcast bus
    pub bus: Arc<BroadcastBus>,
    /// Domain event consumer feeding the bus
    bridge: JoinHandle<()>,
}

impl Application {
    /// Connect the configured stores and providers, then wire everything.
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        let stores = Stores::connect(&config.database).await?;
        let email = build_email_provider(&config.notifications)?;
        let sms = build_sms_provider(&config.notifications)?;
        Ok(Self::assemble(config, stores, email, sms).await)
    }

    /// Wire the application over explicit stores and providers.
    ///
    /// Spawns the event bridge, so it must run inside a Tokio runtime.
    pub async fn assemble(
        config: AppConfig,
        stores: Stores,
        email_provider: Arc<dyn EmailProvider>,
        sms_provider: Arc<dyn SmsProvider>,
    ) -> Self {
        let timeout = Duration::from_secs(config.notifications.provider_timeout_seconds);
        let queue = Arc::new(JobQueue::from_config(&config.worker));
        let task_queue: Arc<dyn TaskQueue> = queue.clone();

        let (events, event_rx) = EventPublisher::channel(config.realtime.event_buffer_size);
        let bus = Arc::new(BroadcastBus::new(&config.realtime));
        let bridge = EventBridge::new(Arc::clone(&bus), config.realtime.crime_alert_topic.clone())
            .spawn(event_rx);

        let resolver = EligibilityResolver::new(Arc::clone(&stores.preferences));
        let email = EmailDispatcher::new(
            email_provider,
            Arc::clone(&stores.receipts),
            config.notifications.email.batch_size,
            timeout,
        );
        let sms = SmsDispatcher::new(
            sms_provider,
            Arc::clone(&stores.receipts),
            Arc::clone(&task_queue),
            config.notifications.sms_preview_chars,
            timeout,
        );

        let dispatch = Arc::new(AlertDispatchService::new(
            Arc::clone(&stores.alerts),
            Arc::clone(&stores.receipts),
            resolver.clone(),
            email.clone(),
            sms.clone(),
            Arc::clone(&task_queue),
            events.clone(),
        ));
        let crimes = Arc::new(CrimeAlertNotifier::new(
            Arc::clone(&stores.crimes),
            resolver.clone(),
            sms.clone(),
            events,
        ));
        let distributor = ReportDistributor::new(resolver, email, config.report.brand.clone());
        let pipeline = Arc::new(ReportPipeline::new(
            &config.report,
            Arc::clone(&stores.crimes),
            distributor,
        ));

        let mut executor = JobExecutor::new();
        executor.register(Arc::new(AlertFanoutHandler::new(Arc::clone(&dispatch))));
        executor.register(Arc::new(SmsDeliveryHandler::new(sms)));
        executor.register(Arc::new(MonthlyReportHandler::new(Arc::clone(&pipeline))));

        Self {
            config: Arc::new(config),
            stores,
            queue,
            executor: Arc::new(executor),
            dispatch,
            crimes,
            pipeline,
            bus,
            bridge,
        }
    }

    /// Spawn a worker runner that stops once `cancel` flips to `true`.
    pub fn spawn_worker(&self, cancel: watch::Receiver<bool>) -> JoinHandle<()> {
        let worker_id = format!("worker-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
        let runner = WorkerRunner::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.executor),
            self.config.worker.clone(),
            worker_id,
        );
        tokio::spawn(async move { runner.run(cancel).await })
    }

    /// Start the cron scheduler with the monthly report registered.
    pub async fn start_scheduler(&self) -> AppResult<CronScheduler> {
        let queue: Arc<dyn TaskQueue> = self.queue.clone();
        let scheduler = CronScheduler::new(queue).await?;
        scheduler
            .register_monthly_report(&self.config.worker.report_schedule, self.config.worker.report_send)
            .await?;
        scheduler.start().await?;
        Ok(scheduler)
    }

    /// Handler state for the router.
    pub fn state(&self) -> AppState {
        AppState {
            config: Arc::clone(&self.config),
            dispatch: Arc::clone(&self.dispatch),
            crimes: Arc::clone(&self.crimes),
            queue: Arc::clone(&self.queue),
            bus: Arc::clone(&self.bus),
            started_at: Instant::now(),
        }
    }

    /// Stop consuming domain events.
    pub fn close(self) {
        self.bridge.abort();
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state).layer(TraceLayer::new_for_http())
}

/// Runs the AlertHub server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting AlertHub server...");

    let app = Application::build(config).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = app
        .config
        .worker
        .enabled
        .then(|| app.spawn_worker(shutdown_rx.clone()));
    let mut scheduler = if app.config.worker.enabled {
        Some(app.start_scheduler().await?)
    } else {
        tracing::warn!("Worker disabled, queued jobs will not run");
        None
    };

    let router = build_app(app.state());
    let addr = format!("{}:{}", app.config.server.host, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("AlertHub server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Shutting down background tasks...");
    let _ = shutdown_tx.send(true);
    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    if let Some(worker) = worker {
        let grace = Duration::from_secs(app.config.server.shutdown_grace_seconds);
        if tokio::time::timeout(grace, worker).await.is_err() {
            tracing::warn!("Worker did not stop within {:?}", grace);
        }
    }
    app.close();

    tracing::info!("AlertHub server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
