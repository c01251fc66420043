use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use alerthub_core::result::AppResult;
use alerthub_entity::receipt::{DeliveryChannel, Receipt};

use super::MemoryStore;
use crate::store::ReceiptStore;

#[async_trait]
impl ReceiptStore for MemoryStore {
    async fn get(&self, alert_id: Uuid, user_id: Uuid) -> AppResult<Option<Receipt>> {
        Ok(self
            .state
            .lock()
            .await
            .receipts
            .get(&(alert_id, user_id))
            .cloned())
    }

    async fn get_or_create(&self, alert_id: Uuid, user_id: Uuid) -> AppResult<Receipt> {
        let mut state = self.state.lock().await;
        Ok(state
            .receipts
            .entry((alert_id, user_id))
            .or_insert_with(|| Receipt::new(alert_id, user_id))
            .clone())
    }

    async fn mark_viewed(&self, alert_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state
            .receipts
            .entry((alert_id, user_id))
            .or_insert_with(|| Receipt::new(alert_id, user_id))
            .mark_viewed(Utc::now()))
    }

    async fn mark_channel_sent(
        &self,
        alert_id: Uuid,
        user_id: Uuid,
        channel: DeliveryChannel,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state
            .receipts
            .entry((alert_id, user_id))
            .or_insert_with(|| Receipt::new(alert_id, user_id))
            .claim(channel))
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let state = self.state.lock().await;
        let now = Utc::now();
        let count = state
            .alerts
            .values()
            .filter(|alert| alert.is_active(now))
            .filter(|alert| {
                !state
                    .receipts
                    .get(&(alert.id, user_id))
                    .is_some_and(|r| r.viewed)
            })
            .count();
        Ok(count as i64)
    }
}
