//! Shared helpers for integration tests.
//!
//! Every test runs the full application over the in-memory stores with
//! recording providers in place of the email and SMS gateways.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use alerthub_api::Application;
use alerthub_core::config::AppConfig;
use alerthub_database::{MemoryStore, PreferenceStore, Stores};
use alerthub_dispatch::provider::{EmailConnection, EmailMessage, EmailProvider, ProviderError};
use alerthub_dispatch::{DispatchSummary, SmsProvider};
use alerthub_entity::alert::{Alert, CreateAlert};
use alerthub_entity::job::JobStatus;
use alerthub_entity::preference::NotificationPreference;

/// Email gateway double that records every message.
#[derive(Debug, Default)]
pub struct RecordingEmail {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    connections: AtomicUsize,
}

impl RecordingEmail {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, address: &str) -> usize {
        self.sent().iter().filter(|m| m.to == address).count()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

struct RecordingEmailConnection {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

#[async_trait]
impl EmailProvider for RecordingEmail {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn connect(&self) -> Result<Box<dyn EmailConnection>, ProviderError> {
        self.connections.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingEmailConnection {
            sent: self.sent.clone(),
        }))
    }
}

#[async_trait]
impl EmailConnection for RecordingEmailConnection {
    async fn send(&mut self, message: &EmailMessage) -> Result<(), ProviderError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// SMS gateway double that records every message.
#[derive(Debug, Default)]
pub struct RecordingSms {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSms {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsProvider for RecordingSms {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, to: &str, body: &str) -> Result<(), ProviderError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

/// A running application with recording providers and a live worker.
pub struct TestApp {
    pub app: Application,
    pub email: Arc<RecordingEmail>,
    pub sms: Arc<RecordingSms>,
    pub report_dir: TempDir,
    cancel: watch::Sender<bool>,
    worker: JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let report_dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.report.output_dir = report_dir.path().display().to_string();
        config.worker.concurrency = 2;
        config.worker.shutdown_timeout_seconds = 1;

        let email = Arc::new(RecordingEmail::default());
        let sms = Arc::new(RecordingSms::default());
        let app = Application::assemble(
            config,
            Stores::memory(MemoryStore::new()),
            email.clone(),
            sms.clone(),
        )
        .await;

        let (cancel, cancel_rx) = watch::channel(false);
        let worker = app.spawn_worker(cancel_rx);

        Self {
            app,
            email,
            sms,
            report_dir,
            cancel,
            worker,
        }
    }

    /// Register a user with default opt-ins.
    pub async fn user(&self, name: &str, email: &str) -> NotificationPreference {
        self.save(NotificationPreference::new(Uuid::new_v4(), name, email))
            .await
    }

    pub async fn save(&self, pref: NotificationPreference) -> NotificationPreference {
        self.app.stores.preferences.upsert(&pref).await.unwrap()
    }

    /// Create an approved alert with only the email channel on.
    pub async fn alert(&self, title: &str) -> Alert {
        self.app
            .dispatch
            .create_alert(CreateAlert::new(title, format!("{title} reported nearby")))
            .await
            .unwrap()
    }

    /// Dispatch an alert and wait until the fan-out and every job it
    /// queued have finished.
    pub async fn dispatch_and_wait(&self, alert_id: Uuid) -> DispatchSummary {
        let ack = self.app.dispatch.dispatch(alert_id).await.unwrap();
        let job = self.app.queue.wait(ack.job_id).await.unwrap();
        self.app.queue.wait_idle().await;
        assert_eq!(job.status, JobStatus::Completed, "{:?}", job.error_message);
        serde_json::from_value(job.result.unwrap()).unwrap()
    }

    pub async fn shutdown(self) {
        self.cancel.send(true).unwrap();
        self.worker.await.unwrap();
        self.app.close();
    }
}
