//! Report data rollup.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use alerthub_core::error::{AppError, ErrorKind};
use alerthub_core::result::AppResult;
use alerthub_database::CrimeReportStore;
use alerthub_entity::crime::CrimeReport;
use alerthub_entity::report::ReportPeriod;

/// One labelled count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    /// Display label.
    pub label: String,
    /// Number of reports.
    pub count: u64,
}

/// Reports filed on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    /// The day.
    pub date: NaiveDate,
    /// Number of reports.
    pub count: u64,
}

/// Aggregated figures for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStats {
    /// The month covered.
    pub period: ReportPeriod,
    /// Reports in the period.
    pub total: u64,
    /// Per category, most frequent first.
    pub by_category: Vec<CountRow>,
    /// Per status, most frequent first.
    pub by_status: Vec<CountRow>,
    /// One entry per day of the month, zero-filled.
    pub daily: Vec<DailyCount>,
    /// Most frequent locations.
    pub top_locations: Vec<CountRow>,
}

impl ReportStats {
    /// Share of the total, formatted to one decimal.
    pub fn percentage(&self, count: u64) -> String {
        if self.total == 0 {
            return "0%".to_string();
        }
        format!("{:.1}%", count as f64 / self.total as f64 * 100.0)
    }

    /// Roll up `reports` for `period`. Reports outside the period are
    /// ignored.
    pub fn from_reports(period: ReportPeriod, reports: &[CrimeReport], top_locations: usize) -> Self {
        let (start, end) = period.window();
        let in_period: Vec<&CrimeReport> = reports
            .iter()
            .filter(|r| r.date_reported >= start && r.date_reported < end)
            .collect();

        let by_category = ranked(in_period.iter().map(|r| r.category.label().to_string()));
        let by_status = ranked(in_period.iter().map(|r| r.status.label().to_string()));
        let mut top = ranked(in_period.iter().map(|r| r.location.trim().to_string()));
        top.truncate(top_locations);

        let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
        for report in &in_period {
            *per_day.entry(report.date_reported.date_naive()).or_default() += 1;
        }
        let daily = period
            .start_date()
            .iter_days()
            .take(period.days_in_month() as usize)
            .map(|date| DailyCount {
                date,
                count: per_day.get(&date).copied().unwrap_or(0),
            })
            .collect();

        Self {
            period,
            total: in_period.len() as u64,
            by_category,
            by_status,
            daily,
            top_locations: top,
        }
    }
}

/// Count occurrences, highest count first, ties by label.
fn ranked(labels: impl Iterator<Item = String>) -> Vec<CountRow> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut rows: Vec<CountRow> = counts
        .into_iter()
        .map(|(label, count)| CountRow { label, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    rows
}

/// Loads a period's crime reports and rolls them up.
#[derive(Debug, Clone)]
pub struct Aggregator {
    crimes: Arc<dyn CrimeReportStore>,
    top_locations: usize,
}

impl Aggregator {
    /// Create an aggregator.
    pub fn new(crimes: Arc<dyn CrimeReportStore>, top_locations: usize) -> Self {
        Self {
            crimes,
            top_locations,
        }
    }

    /// Aggregate `period`. Any failure is an aggregation error.
    pub async fn aggregate(&self, period: ReportPeriod) -> AppResult<ReportStats> {
        let (start, end) = period.window();
        let reports = self
            .crimes
            .find_reported_between(start, end)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Aggregation, format!("Failed to load crime data for {period}"), e))?;

        let stats = ReportStats::from_reports(period, &reports, self.top_locations);
        info!(period = %period, total = stats.total, "Crime data aggregated");
        Ok(stats)
    }
}
