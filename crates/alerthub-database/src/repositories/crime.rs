//! Crime report repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use alerthub_core::error::{AppError, ErrorKind};
use alerthub_core::result::AppResult;
use alerthub_entity::crime::CrimeReport;

use crate::store::CrimeReportStore;

/// Repository for the `crime_reports` table.
#[derive(Debug, Clone)]
pub struct CrimeReportRepository {
    pool: PgPool,
}

impl CrimeReportRepository {
    /// Create a new crime report repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrimeReportStore for CrimeReportRepository {
    async fn create(&self, report: &CrimeReport) -> AppResult<CrimeReport> {
        sqlx::query_as::<_, CrimeReport>(
            "INSERT INTO crime_reports (id, title, description, location, category, status, date_reported) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(report.id)
        .bind(&report.title)
        .bind(&report.description)
        .bind(&report.location)
        .bind(report.category)
        .bind(report.status)
        .bind(report.date_reported)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create crime report", e))
    }

    async fn find_reported_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CrimeReport>> {
        sqlx::query_as::<_, CrimeReport>(
            "SELECT * FROM crime_reports \
             WHERE date_reported >= $1 AND date_reported < $2 \
             ORDER BY date_reported, id",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Aggregation, "Failed to load crime reports", e))
    }
}
