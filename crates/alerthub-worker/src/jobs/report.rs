//! Monthly report job handler.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use alerthub_entity::job::payload::MONTHLY_REPORT;
use alerthub_entity::job::{Job, JobPayload};
use alerthub_entity::report::ReportPeriod;
use alerthub_report::ReportPipeline;

use crate::executor::{JobExecutionError, JobHandler};

/// Generates and optionally mails a monthly report
#[derive(Debug, Clone)]
pub struct MonthlyReportHandler {
    pipeline: Arc<ReportPipeline>,
}

impl MonthlyReportHandler {
    /// Create a new report handler
    pub fn new(pipeline: Arc<ReportPipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl JobHandler for MonthlyReportHandler {
    fn job_type(&self) -> &str {
        MONTHLY_REPORT
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let JobPayload::MonthlyReport { year, month, send } = super::payload(job)? else {
            return Err(JobExecutionError::Permanent(format!(
                "Job {} does not carry a report payload",
                job.id
            )));
        };

        let period = ReportPeriod::resolve(year, month, Utc::now().date_naive())
            .map_err(JobExecutionError::from_app)?;

        let run = self
            .pipeline
            .run(period, send)
            .await
            .map_err(JobExecutionError::from_app)?;

        tracing::info!(
            period = %period,
            path = %run.document.path.display(),
            "Monthly report job finished"
        );

        Ok(Some(json!({
            "period": period.to_string(),
            "path": run.document.path.display().to_string(),
            "total": run.document.stats.total,
            "omitted_charts": run.document.omitted_charts,
            "delivered": run.delivery.map(|tally| tally.delivered),
        })))
    }
}
