//! Receipt repository implementation.
//!
//! Each mutation is one statement keyed on the `(alert_id, user_id)`
//! primary key, so two workers racing on the same receipt can never both
//! observe a flag as unset and both deliver.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use alerthub_core::error::{AppError, ErrorKind};
use alerthub_core::result::AppResult;
use alerthub_entity::receipt::{DeliveryChannel, Receipt};

use crate::store::ReceiptStore;

/// Repository for the `alert_receipts` table.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: PgPool,
}

impl ReceiptRepository {
    /// Create a new receipt repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReceiptStore for ReceiptRepository {
    async fn get(&self, alert_id: Uuid, user_id: Uuid) -> AppResult<Option<Receipt>> {
        sqlx::query_as::<_, Receipt>(
            "SELECT * FROM alert_receipts WHERE alert_id = $1 AND user_id = $2",
        )
        .bind(alert_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find receipt", e))
    }

    async fn get_or_create(&self, alert_id: Uuid, user_id: Uuid) -> AppResult<Receipt> {
        sqlx::query(
            "INSERT INTO alert_receipts (alert_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (alert_id, user_id) DO NOTHING",
        )
        .bind(alert_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create receipt", e))?;

        self.get(alert_id, user_id)
            .await?
            .ok_or_else(|| AppError::database("Receipt vanished after upsert"))
    }

    async fn mark_viewed(&self, alert_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO alert_receipts (alert_id, user_id, viewed, viewed_at) \
             VALUES ($1, $2, TRUE, NOW()) \
             ON CONFLICT (alert_id, user_id) DO UPDATE \
             SET viewed = TRUE, viewed_at = EXCLUDED.viewed_at \
             WHERE alert_receipts.viewed = FALSE",
        )
        .bind(alert_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark receipt viewed", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_channel_sent(
        &self,
        alert_id: Uuid,
        user_id: Uuid,
        channel: DeliveryChannel,
    ) -> AppResult<bool> {
        let column = channel.receipt_column();
        let sql = format!(
            "INSERT INTO alert_receipts (alert_id, user_id, {column}) VALUES ($1, $2, TRUE) \
             ON CONFLICT (alert_id, user_id) DO UPDATE SET {column} = TRUE \
             WHERE alert_receipts.{column} = FALSE"
        );

        let result = sqlx::query(&sql)
            .bind(alert_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to claim {channel} delivery"),
                    e,
                )
            })?;

        Ok(result.rows_affected() == 1)
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM alerts a \
             WHERE a.is_approved \
             AND (a.expires_at IS NULL OR a.expires_at > NOW()) \
             AND NOT EXISTS ( \
                 SELECT 1 FROM alert_receipts r \
                 WHERE r.alert_id = a.id AND r.user_id = $1 AND r.viewed \
             )",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread alerts", e))
    }
}
