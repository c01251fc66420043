//! Notification preference repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use alerthub_core::error::{AppError, ErrorKind};
use alerthub_core::result::AppResult;
use alerthub_entity::preference::{NotificationPreference, RecipientFilter};

use crate::store::PreferenceStore;

const HAS_PHONE: &str = "phone_number IS NOT NULL AND btrim(phone_number) <> ''";

/// Repository for the `notification_preferences` table.
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    /// Create a new preference repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn filter_clause(filter: RecipientFilter) -> String {
    match filter {
        RecipientFilter::EmailOptIn => "email_notifications".to_string(),
        RecipientFilter::SmsOptIn => format!("sms_notifications AND {HAS_PHONE}"),
        RecipientFilter::HasPhone => HAS_PHONE.to_string(),
    }
}

#[async_trait]
impl PreferenceStore for PreferenceRepository {
    async fn upsert(&self, pref: &NotificationPreference) -> AppResult<NotificationPreference> {
        sqlx::query_as::<_, NotificationPreference>(
            "INSERT INTO notification_preferences \
             (user_id, display_name, email, phone_number, email_notifications, sms_notifications, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 display_name = EXCLUDED.display_name, \
                 email = EXCLUDED.email, \
                 phone_number = EXCLUDED.phone_number, \
                 email_notifications = EXCLUDED.email_notifications, \
                 sms_notifications = EXCLUDED.sms_notifications, \
                 updated_at = NOW() \
             RETURNING *",
        )
        .bind(pref.user_id)
        .bind(&pref.display_name)
        .bind(&pref.email)
        .bind(&pref.phone_number)
        .bind(pref.email_notifications)
        .bind(pref.sms_notifications)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert preferences", e))
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<NotificationPreference>> {
        sqlx::query_as::<_, NotificationPreference>(
            "SELECT * FROM notification_preferences WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find preferences", e))
    }

    async fn find_matching(
        &self,
        filter: RecipientFilter,
    ) -> AppResult<Vec<NotificationPreference>> {
        let sql = format!(
            "SELECT * FROM notification_preferences WHERE {} ORDER BY user_id",
            filter_clause(filter)
        );
        sqlx::query_as::<_, NotificationPreference>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list recipients", e))
    }
}
