use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use alerthub_core::result::AppResult;
use alerthub_entity::preference::{NotificationPreference, RecipientFilter};

use super::MemoryStore;
use crate::store::PreferenceStore;

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn upsert(&self, pref: &NotificationPreference) -> AppResult<NotificationPreference> {
        let mut stored = pref.clone();
        stored.updated_at = Utc::now();
        self.state
            .lock()
            .await
            .preferences
            .insert(stored.user_id, stored.clone());
        Ok(stored)
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<NotificationPreference>> {
        Ok(self.state.lock().await.preferences.get(&user_id).cloned())
    }

    async fn find_matching(
        &self,
        filter: RecipientFilter,
    ) -> AppResult<Vec<NotificationPreference>> {
        Ok(self
            .state
            .lock()
            .await
            .preferences
            .values()
            .filter(|pref| filter.matches(pref))
            .cloned()
            .collect())
    }
}
