use async_trait::async_trait;
use chrono::{DateTime, Utc};

use alerthub_core::result::AppResult;
use alerthub_entity::crime::CrimeReport;

use super::MemoryStore;
use crate::store::CrimeReportStore;

#[async_trait]
impl CrimeReportStore for MemoryStore {
    async fn create(&self, report: &CrimeReport) -> AppResult<CrimeReport> {
        self.state.lock().await.crimes.push(report.clone());
        Ok(report.clone())
    }

    async fn find_reported_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CrimeReport>> {
        let state = self.state.lock().await;
        let mut reports: Vec<CrimeReport> = state
            .crimes
            .iter()
            .filter(|r| r.date_reported >= start && r.date_reported < end)
            .cloned()
            .collect();
        reports.sort_by(|a, b| a.date_reported.cmp(&b.date_reported).then(a.id.cmp(&b.id)));
        Ok(reports)
    }
}
