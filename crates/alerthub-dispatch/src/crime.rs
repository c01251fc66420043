//! Crime report write path: persist, broadcast, text everyone with a
//! phone number.

use std::sync::Arc;

use tracing::{error, info};

use alerthub_core::events::{CrimeEvent, DomainEvent, EventPayload, EventPublisher};
use alerthub_core::result::AppResult;
use alerthub_database::CrimeReportStore;
use alerthub_entity::crime::{CreateCrimeReport, CrimeReport};

use crate::eligibility::EligibilityResolver;
use crate::sms::SmsDispatcher;

/// Handles newly filed crime reports.
#[derive(Debug, Clone)]
pub struct CrimeAlertNotifier {
    crimes: Arc<dyn CrimeReportStore>,
    resolver: EligibilityResolver,
    sms: SmsDispatcher,
    events: EventPublisher,
}

impl CrimeAlertNotifier {
    /// Create the notifier.
    pub fn new(
        crimes: Arc<dyn CrimeReportStore>,
        resolver: EligibilityResolver,
        sms: SmsDispatcher,
        events: EventPublisher,
    ) -> Self {
        Self {
            crimes,
            resolver,
            sms,
            events,
        }
    }

    /// Persist a crime report, then announce it.
    ///
    /// Only persistence can fail the call. Announcement problems are
    /// logged.
    pub async fn report_crime(&self, input: CreateCrimeReport) -> AppResult<CrimeReport> {
        let report = input.into_report()?;
        let report = self.crimes.create(&report).await?;
        info!(report_id = %report.id, category = %report.category.as_str(), "Crime report filed");

        let event = CrimeEvent::Reported {
            report_id: report.id,
            title: report.title.clone(),
            location: report.location.clone(),
            occurred_at: report.date_reported,
        };
        let message = event.message();
        self.events
            .publish(DomainEvent::new(None, EventPayload::Crime(event)));

        match self.resolver.phone_recipients().await {
            Ok(recipients) => {
                self.sms.queue_broadcast(&recipients, &message).await;
            }
            Err(e) => {
                error!(report_id = %report.id, error = %e, "Failed to resolve SMS recipients for crime alert");
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use alerthub_database::{MemoryStore, PreferenceStore};
    use alerthub_entity::crime::{CrimeCategory, CrimeStatus};
    use alerthub_entity::preference::NotificationPreference;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use crate::test_support::{RecordingQueue, RecordingSmsProvider};

    #[tokio::test]
    async fn test_report_crime_publishes_and_texts_phone_holders() {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(RecordingQueue::default());
        let (events, mut rx) = EventPublisher::channel(4);

        let mut opted_out = NotificationPreference::new(Uuid::new_v4(), "A", "a@example.com")
            .with_phone("+15550001");
        opted_out.sms_notifications = false;
        store.upsert(&opted_out).await.unwrap();
        store
            .upsert(&NotificationPreference::new(Uuid::new_v4(), "B", "b@example.com"))
            .await
            .unwrap();

        let notifier = CrimeAlertNotifier::new(
            store.clone(),
            EligibilityResolver::new(store.clone()),
            SmsDispatcher::new(
                Arc::new(RecordingSmsProvider::default()),
                store.clone(),
                queue.clone(),
                100,
                Duration::from_secs(1),
            ),
            events,
        );

        notifier
            .report_crime(CreateCrimeReport {
                title: "Break-in".to_string(),
                description: String::new(),
                location: "Main Rd".to_string(),
                category: CrimeCategory::Burglary,
                status: CrimeStatus::Pending,
                date_reported: Some(Utc.with_ymd_and_hms(2024, 5, 3, 21, 15, 0).unwrap()),
            })
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert!(matches!(event.payload, EventPayload::Crime(_)));

        let jobs = queue.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].1["to"], "+15550001");
        assert_eq!(
            jobs[0].1["body"],
            "New Crime Alert: Break-in at Main Rd on 2024-05-03 21:15"
        );
    }
}
