//! Aggregate → Render → Assemble → Distribute.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use alerthub_core::config::ReportConfig;
use alerthub_core::result::AppResult;
use alerthub_database::CrimeReportStore;
use alerthub_dispatch::DeliveryTally;
use alerthub_entity::report::ReportPeriod;

use crate::aggregate::{Aggregator, ReportStats};
use crate::chart::{Chart, ChartRenderer};
use crate::distribute::ReportDistributor;
use crate::document::{DocumentAssembler, RenderedCharts, ReportDocument};

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRun {
    /// The generated document.
    pub document: ReportDocument,
    /// Mail-out counters, when the report was sent.
    pub delivery: Option<DeliveryTally>,
}

/// The monthly report pipeline.
///
/// An aggregation failure aborts the run. A chart that fails to render
/// is left out and the run continues.
#[derive(Debug, Clone)]
pub struct ReportPipeline {
    aggregator: Aggregator,
    renderer: ChartRenderer,
    assembler: DocumentAssembler,
    distributor: ReportDistributor,
}

impl ReportPipeline {
    /// Build the pipeline.
    pub fn new(
        config: &ReportConfig,
        crimes: Arc<dyn CrimeReportStore>,
        distributor: ReportDistributor,
    ) -> Self {
        Self {
            aggregator: Aggregator::new(crimes, config.top_locations),
            renderer: ChartRenderer::new(config.chart_width, config.chart_height),
            assembler: DocumentAssembler::new(config),
            distributor,
        }
    }

    /// Generate the document for `period`, overwriting an earlier one.
    pub async fn generate(&self, period: ReportPeriod) -> AppResult<ReportDocument> {
        info!(period = %period, "Generating crime report");

        let stats = self.aggregator.aggregate(period).await?;
        let (charts, omitted_charts) = self.render(&stats);
        let html = self
            .assembler
            .render_html(&stats, &charts, Utc::now().date_naive());
        let path = self.assembler.write(period, &html).await?;

        Ok(ReportDocument {
            period,
            title: self.assembler.title(period),
            path,
            stats,
            omitted_charts,
        })
    }

    /// Generate and mail the document.
    pub async fn generate_and_send(&self, period: ReportPeriod) -> AppResult<ReportRun> {
        self.run(period, true).await
    }

    /// Generate, then send when `send` is set.
    pub async fn run(&self, period: ReportPeriod, send: bool) -> AppResult<ReportRun> {
        let document = self.generate(period).await?;
        let delivery = if send {
            Some(self.distributor.distribute(&document).await?)
        } else {
            None
        };
        Ok(ReportRun { document, delivery })
    }

    fn render(&self, stats: &ReportStats) -> (RenderedCharts, Vec<String>) {
        let mut omitted = Vec::new();
        let mut keep = |name: &str, result: AppResult<Option<Chart>>| match result {
            Ok(chart) => chart,
            Err(e) => {
                warn!(chart = name, error = %e, "Chart omitted from report");
                omitted.push(name.to_string());
                None
            }
        };

        let charts = RenderedCharts {
            category: keep("category", self.renderer.category_pie(&stats.by_category)),
            status: keep("status", self.renderer.status_bar(&stats.by_status)),
            daily: keep("daily", self.renderer.daily_line(&stats.daily).map(Some)),
        };
        (charts, omitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use alerthub_core::error::{AppError, ErrorKind};
    use alerthub_database::{MemoryStore, PreferenceStore};
    use alerthub_dispatch::provider::{EmailConnection, EmailProvider, ProviderError};
    use alerthub_dispatch::{EligibilityResolver, EmailDispatcher, EmailMessage};
    use alerthub_entity::crime::{CrimeCategory, CrimeReport, CrimeStatus};
    use alerthub_entity::preference::NotificationPreference;

    #[derive(Debug, Default)]
    struct Outbox(Arc<Mutex<Vec<EmailMessage>>>);

    struct OutboxConnection(Arc<Mutex<Vec<EmailMessage>>>);

    #[async_trait]
    impl EmailProvider for Outbox {
        fn name(&self) -> &'static str {
            "outbox"
        }

        async fn connect(&self) -> Result<Box<dyn EmailConnection>, ProviderError> {
            Ok(Box::new(OutboxConnection(self.0.clone())))
        }
    }

    #[async_trait]
    impl EmailConnection for OutboxConnection {
        async fn send(&mut self, message: &EmailMessage) -> Result<(), ProviderError> {
            self.0.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[derive(Debug)]
    struct BrokenCrimes;

    #[async_trait]
    impl CrimeReportStore for BrokenCrimes {
        async fn create(&self, _report: &CrimeReport) -> AppResult<CrimeReport> {
            Err(AppError::database("down"))
        }

        async fn find_reported_between(
            &self,
            _start: chrono::DateTime<Utc>,
            _end: chrono::DateTime<Utc>,
        ) -> AppResult<Vec<CrimeReport>> {
            Err(AppError::database("down"))
        }
    }

    fn config(dir: &std::path::Path) -> ReportConfig {
        ReportConfig {
            output_dir: dir.to_string_lossy().into_owned(),
            chart_width: 200,
            chart_height: 120,
            ..ReportConfig::default()
        }
    }

    fn pipeline(config: &ReportConfig, store: Arc<MemoryStore>, outbox: Arc<Outbox>) -> ReportPipeline {
        let email = EmailDispatcher::new(outbox, store.clone(), 50, Duration::from_secs(1));
        let distributor =
            ReportDistributor::new(EligibilityResolver::new(store.clone()), email, &config.brand);
        ReportPipeline::new(config, store, distributor)
    }

    async fn seed(store: &MemoryStore) {
        for (day, category) in [(3, CrimeCategory::Theft), (3, CrimeCategory::Theft), (17, CrimeCategory::Assault)] {
            let report = CrimeReport {
                id: Uuid::new_v4(),
                title: "Incident".to_string(),
                description: String::new(),
                location: "Main Rd".to_string(),
                category,
                status: CrimeStatus::Pending,
                date_reported: Utc.with_ymd_and_hms(2024, 4, day, 12, 0, 0).unwrap(),
            };
            CrimeReportStore::create(store, &report).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_generate_is_deterministic_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        seed(&store).await;
        let pipeline = pipeline(&config(dir.path()), store, Arc::new(Outbox::default()));
        let period = ReportPeriod::new(2024, 4).unwrap();

        let first = pipeline.generate(period).await.unwrap();
        let second = pipeline.generate(period).await.unwrap();

        assert_eq!(first.path, second.path);
        assert_eq!(first.stats.total, 3);
        assert_eq!(first.stats, second.stats);
        assert_eq!(first.stats.daily.len(), 30);
        assert!(first.omitted_charts.is_empty());
        assert_eq!(first.title, "KingsPark Crime Report - April 2024");

        let html = tokio::fs::read_to_string(&first.path).await.unwrap();
        assert_eq!(html.matches("<img").count(), 3);
        assert!(html.contains("<td>66.7%</td>"));
    }

    #[tokio::test]
    async fn test_render_failure_omits_charts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.chart_width = 8;
        let store = Arc::new(MemoryStore::new());
        seed(&store).await;

        let document = pipeline(&config, store, Arc::new(Outbox::default()))
            .generate(ReportPeriod::new(2024, 4).unwrap())
            .await
            .unwrap();

        assert_eq!(document.omitted_charts, vec!["category", "status", "daily"]);
        let html = tokio::fs::read_to_string(&document.path).await.unwrap();
        assert!(!html.contains("<img"));
        assert!(html.contains("Crimes by Category"));
    }

    #[tokio::test]
    async fn test_aggregation_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let store = Arc::new(MemoryStore::new());
        let email = EmailDispatcher::new(Arc::new(Outbox::default()), store.clone(), 50, Duration::from_secs(1));
        let distributor = ReportDistributor::new(EligibilityResolver::new(store), email, "KingsPark");
        let pipeline = ReportPipeline::new(&config, Arc::new(BrokenCrimes), distributor);

        let err = pipeline
            .generate(ReportPeriod::new(2024, 4).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Aggregation);
    }

    #[tokio::test]
    async fn test_send_mails_opted_in_users_with_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        seed(&store).await;
        store
            .upsert(&NotificationPreference::new(Uuid::new_v4(), "Ada", "ada@example.com"))
            .await
            .unwrap();
        let mut opted_out = NotificationPreference::new(Uuid::new_v4(), "Bo", "bo@example.com");
        opted_out.email_notifications = false;
        store.upsert(&opted_out).await.unwrap();

        let outbox = Arc::new(Outbox::default());
        let run = pipeline(&config(dir.path()), store, outbox.clone())
            .generate_and_send(ReportPeriod::new(2024, 4).unwrap())
            .await
            .unwrap();

        assert_eq!(run.delivery.unwrap().delivered, 1);
        let sent = outbox.0.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@example.com");
        assert_eq!(sent[0].subject, "KingsPark Crime Report - April 2024");
        assert_eq!(sent[0].attachments[0].filename, "KingsPark_Crime_Report_April_2024.html");
        assert!(sent[0].body_text.starts_with("Dear Ada,"));
    }
}
