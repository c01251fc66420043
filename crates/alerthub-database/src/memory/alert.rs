use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use alerthub_core::error::AppError;
use alerthub_core::result::AppResult;
use alerthub_entity::alert::Alert;

use super::MemoryStore;
use crate::store::AlertStore;

#[async_trait]
impl AlertStore for MemoryStore {
    async fn create(&self, alert: &Alert) -> AppResult<Alert> {
        let mut state = self.state.lock().await;
        if state.alerts.contains_key(&alert.id) {
            return Err(AppError::database(format!("Alert {} already exists", alert.id)));
        }
        state.alerts.insert(alert.id, alert.clone());
        Ok(alert.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Alert>> {
        Ok(self.state.lock().await.alerts.get(&id).cloned())
    }

    async fn approve(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state
            .alerts
            .get_mut(&id)
            .map(|alert| alert.is_approved = true)
            .is_some())
    }

    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state
            .alerts
            .get_mut(&id)
            .map(|alert| {
                alert.is_sent = true;
                alert.sent_at = Some(sent_at);
            })
            .is_some())
    }
}
