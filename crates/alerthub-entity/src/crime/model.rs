//! Crime report entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use alerthub_core::error::AppError;
use alerthub_core::result::AppResult;

use super::category::{CrimeCategory, CrimeStatus};

/// A filed crime report.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CrimeReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// Short headline.
    pub title: String,
    /// Details.
    pub description: String,
    /// Free-text location.
    pub location: String,
    /// Category.
    pub category: CrimeCategory,
    /// Investigation status.
    pub status: CrimeStatus,
    /// When the report was filed.
    pub date_reported: DateTime<Utc>,
}

/// Data required to file a crime report.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCrimeReport {
    /// Short headline.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Details.
    #[serde(default)]
    pub description: String,
    /// Free-text location.
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    /// Category.
    pub category: CrimeCategory,
    /// Status, `PENDING` when omitted.
    #[serde(default)]
    pub status: CrimeStatus,
    /// Filing time, now when omitted.
    pub date_reported: Option<DateTime<Utc>>,
}

impl CreateCrimeReport {
    /// Validate and materialize a new report row.
    pub fn into_report(self) -> AppResult<CrimeReport> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Invalid crime report: {e}")))?;

        Ok(CrimeReport {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            location: self.location,
            category: self.category,
            status: self.status,
            date_reported: self.date_reported.unwrap_or_else(Utc::now),
        })
    }
}
