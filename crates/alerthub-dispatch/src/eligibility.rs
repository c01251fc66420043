//! Candidate recipient resolution.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use alerthub_core::result::AppResult;
use alerthub_database::PreferenceStore;
use alerthub_entity::alert::Alert;
use alerthub_entity::preference::{NotificationPreference, RecipientFilter};

/// Recipients per channel for one alert.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    /// Users to email.
    pub email: Vec<NotificationPreference>,
    /// Users to text.
    pub sms: Vec<NotificationPreference>,
    /// Users to push to. Always empty until push delivery exists.
    pub push: Vec<NotificationPreference>,
}

impl CandidateSet {
    /// Distinct users across all channels.
    pub fn total(&self) -> usize {
        self.email
            .iter()
            .chain(&self.sms)
            .chain(&self.push)
            .map(|p| p.user_id)
            .collect::<HashSet<Uuid>>()
            .len()
    }

    /// No recipient on any channel.
    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.sms.is_empty() && self.push.is_empty()
    }
}

/// Decides who receives an alert on which channel.
///
/// Targeting radius and coordinates are recorded on alerts but never
/// narrow the candidate set.
#[derive(Debug, Clone)]
pub struct EligibilityResolver {
    preferences: Arc<dyn PreferenceStore>,
}

impl EligibilityResolver {
    /// Create a resolver over the preference store.
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { preferences }
    }

    /// Per-channel candidates for `alert`. A channel switched off on the
    /// alert gets an empty set.
    pub async fn resolve(&self, alert: &Alert) -> AppResult<CandidateSet> {
        if alert.radius_meters > 0 {
            debug!(
                alert_id = %alert.id,
                radius_meters = alert.radius_meters,
                "Alert radius is recorded but does not filter recipients"
            );
        }

        let email = if alert.send_email {
            self.email_recipients().await?
        } else {
            Vec::new()
        };
        let sms = if alert.send_sms {
            self.preferences.find_matching(RecipientFilter::SmsOptIn).await?
        } else {
            Vec::new()
        };

        let set = CandidateSet {
            email,
            sms,
            push: Vec::new(),
        };
        debug!(
            alert_id = %alert.id,
            email = set.email.len(),
            sms = set.sms.len(),
            "Resolved alert candidates"
        );
        Ok(set)
    }

    /// Users opted in to email.
    pub async fn email_recipients(&self) -> AppResult<Vec<NotificationPreference>> {
        self.preferences.find_matching(RecipientFilter::EmailOptIn).await
    }

    /// Users with a phone number, regardless of SMS opt-in.
    pub async fn phone_recipients(&self) -> AppResult<Vec<NotificationPreference>> {
        self.preferences.find_matching(RecipientFilter::HasPhone).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerthub_database::MemoryStore;
    use alerthub_entity::alert::CreateAlert;

    async fn seeded() -> (EligibilityResolver, Uuid, Uuid, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        store
            .upsert(&NotificationPreference::new(a, "A", "a@example.com").with_phone("+15550001"))
            .await
            .unwrap();
        let mut pb = NotificationPreference::new(b, "B", "b@example.com");
        pb.email_notifications = false;
        store.upsert(&pb).await.unwrap();
        let mut pc = NotificationPreference::new(c, "C", "c@example.com").with_phone("+15550003");
        pc.sms_notifications = false;
        store.upsert(&pc).await.unwrap();

        (EligibilityResolver::new(store), a, b, c)
    }

    #[tokio::test]
    async fn test_radius_does_not_filter() {
        let (resolver, a, _b, c) = seeded().await;
        let mut create = CreateAlert::new("Fire", "Evacuate");
        create.latitude = Some(-26.2);
        create.longitude = Some(28.0);
        create.radius_meters = 10;
        let alert = create.into_alert().unwrap();

        let set = resolver.resolve(&alert).await.unwrap();
        let ids: Vec<Uuid> = set.email.iter().map(|p| p.user_id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a));
        assert!(ids.contains(&c));
    }

    #[tokio::test]
    async fn test_sms_requires_opt_in_and_phone() {
        let (resolver, a, _b, _c) = seeded().await;
        let mut create = CreateAlert::new("Fire", "Evacuate");
        create.send_email = false;
        create.send_sms = true;
        let alert = create.into_alert().unwrap();

        let set = resolver.resolve(&alert).await.unwrap();
        assert!(set.email.is_empty());
        assert_eq!(set.sms.len(), 1);
        assert_eq!(set.sms[0].user_id, a);
        assert_eq!(set.total(), 1);
    }

    #[tokio::test]
    async fn test_phone_recipients_ignore_opt_in() {
        let (resolver, _a, _b, _c) = seeded().await;
        assert_eq!(resolver.phone_recipients().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_no_preferences_is_empty_not_error() {
        let resolver = EligibilityResolver::new(Arc::new(MemoryStore::new()));
        let alert = CreateAlert::new("Fire", "Evacuate").into_alert().unwrap();
        let set = resolver.resolve(&alert).await.unwrap();
        assert!(set.is_empty());
        assert_eq!(set.total(), 0);
    }
}
