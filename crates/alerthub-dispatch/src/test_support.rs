//! Recording providers for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::provider::{EmailConnection, EmailMessage, EmailProvider, ProviderError, SmsProvider};

#[derive(Debug, Default)]
pub struct RecordingEmailProvider {
    sent: std::sync::Arc<Mutex<Vec<EmailMessage>>>,
    connections: AtomicUsize,
    fail_for: Option<String>,
    refuse_connect: bool,
}

impl RecordingEmailProvider {
    pub fn unreachable() -> Self {
        Self {
            refuse_connect: true,
            ..Self::default()
        }
    }

    pub fn failing_for(address: &str) -> Self {
        Self {
            fail_for: Some(address.to_string()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

struct RecordingConnection {
    sent: std::sync::Arc<Mutex<Vec<EmailMessage>>>,
    fail_for: Option<String>,
}

#[async_trait]
impl EmailProvider for RecordingEmailProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn connect(&self) -> Result<Box<dyn EmailConnection>, ProviderError> {
        self.connections.fetch_add(1, Ordering::SeqCst);
        if self.refuse_connect {
            return Err(ProviderError::Request("connection refused".to_string()));
        }
        Ok(Box::new(RecordingConnection {
            sent: self.sent.clone(),
            fail_for: self.fail_for.clone(),
        }))
    }
}

#[async_trait]
impl EmailConnection for RecordingConnection {
    async fn send(&mut self, message: &EmailMessage) -> Result<(), ProviderError> {
        if self.fail_for.as_deref() == Some(message.to.as_str()) {
            return Err(ProviderError::Rejected {
                status: 550,
                body: "mailbox unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingSmsProvider {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSmsProvider {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsProvider for RecordingSmsProvider {
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

/// Task queue that records jobs instead of running them.
#[derive(Debug, Default)]
pub struct RecordingQueue {
    jobs: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingQueue {
    pub fn jobs(&self) -> Vec<(String, serde_json::Value)> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl alerthub_core::traits::TaskQueue for RecordingQueue {
    async fn enqueue(
        &self,
        job_type: &str,
        payload: serde_json::Value,
    ) -> alerthub_core::result::AppResult<uuid::Uuid> {
        self.jobs
            .lock()
            .unwrap()
            .push((job_type.to_string(), payload));
        Ok(uuid::Uuid::new_v4())
    }
}
