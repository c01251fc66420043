//! Alert repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use alerthub_core::error::{AppError, ErrorKind};
use alerthub_core::result::AppResult;
use alerthub_entity::alert::Alert;

use crate::store::AlertStore;

/// Repository for the `alerts` table.
#[derive(Debug, Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    /// Create a new alert repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertStore for AlertRepository {
    async fn create(&self, alert: &Alert) -> AppResult<Alert> {
        sqlx::query_as::<_, Alert>(
            "INSERT INTO alerts (id, title, content, severity, location, latitude, longitude, \
             radius_meters, send_email, send_sms, send_push, is_approved, expires_at, is_sent, \
             sent_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING *",
        )
        .bind(alert.id)
        .bind(&alert.title)
        .bind(&alert.content)
        .bind(alert.severity)
        .bind(&alert.location)
        .bind(alert.latitude)
        .bind(alert.longitude)
        .bind(alert.radius_meters)
        .bind(alert.send_email)
        .bind(alert.send_sms)
        .bind(alert.send_push)
        .bind(alert.is_approved)
        .bind(alert.expires_at)
        .bind(alert.is_sent)
        .bind(alert.sent_at)
        .bind(alert.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create alert", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Alert>> {
        sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find alert", e))
    }

    async fn approve(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE alerts SET is_approved = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to approve alert", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query("UPDATE alerts SET is_sent = TRUE, sent_at = $2 WHERE id = $1")
            .bind(id)
            .bind(sent_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to mark alert as sent", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
