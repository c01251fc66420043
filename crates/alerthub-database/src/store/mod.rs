//! Store traits shared by the PostgreSQL and in-memory backends.
//!
//! Services only ever see these traits, wired through [`Stores`], so the
//! same dispatch and report code runs against either backend.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use alerthub_core::config::{DatabaseConfig, StoreBackend};
use alerthub_core::result::AppResult;
use alerthub_entity::alert::Alert;
use alerthub_entity::crime::CrimeReport;
use alerthub_entity::preference::{NotificationPreference, RecipientFilter};
use alerthub_entity::receipt::{DeliveryChannel, Receipt};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration;
use crate::repositories::{
    AlertRepository, CrimeReportRepository, PreferenceRepository, ReceiptRepository,
};

/// Alert persistence.
#[async_trait]
pub trait AlertStore: Send + Sync + std::fmt::Debug {
    /// Insert a new alert.
    async fn create(&self, alert: &Alert) -> AppResult<Alert>;

    /// Find an alert by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Alert>>;

    /// Approve an alert. Returns `false` when it does not exist.
    async fn approve(&self, id: Uuid) -> AppResult<bool>;

    /// Set `is_sent` and `sent_at`. Returns `false` when it does not exist.
    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> AppResult<bool>;
}

/// The per-(alert, user) delivery and view record.
///
/// Every mutating operation is a single atomic step, so concurrent
/// callers never create duplicate rows or both win the same flag.
#[async_trait]
pub trait ReceiptStore: Send + Sync + std::fmt::Debug {
    /// Read a receipt.
    async fn get(&self, alert_id: Uuid, user_id: Uuid) -> AppResult<Option<Receipt>>;

    /// Return the receipt, creating an empty one if missing.
    async fn get_or_create(&self, alert_id: Uuid, user_id: Uuid) -> AppResult<Receipt>;

    /// Record the first view. Returns `true` only if this call set it.
    async fn mark_viewed(&self, alert_id: Uuid, user_id: Uuid) -> AppResult<bool>;

    /// Claim delivery through `channel`. Returns `true` only for the
    /// single caller that flipped the flag from `false` to `true`.
    async fn mark_channel_sent(
        &self,
        alert_id: Uuid,
        user_id: Uuid,
        channel: DeliveryChannel,
    ) -> AppResult<bool>;

    /// Approved, unexpired alerts the user has not viewed.
    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64>;
}

/// Notification preference persistence.
#[async_trait]
pub trait PreferenceStore: Send + Sync + std::fmt::Debug {
    /// Insert or replace a user's preferences.
    async fn upsert(&self, pref: &NotificationPreference) -> AppResult<NotificationPreference>;

    /// Preferences of one user.
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<NotificationPreference>>;

    /// All users passing `filter`, ordered by user ID.
    async fn find_matching(&self, filter: RecipientFilter)
    -> AppResult<Vec<NotificationPreference>>;
}

/// Crime report persistence.
#[async_trait]
pub trait CrimeReportStore: Send + Sync + std::fmt::Debug {
    /// Insert a report.
    async fn create(&self, report: &CrimeReport) -> AppResult<CrimeReport>;

    /// Reports with `start <= date_reported < end`.
    async fn find_reported_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CrimeReport>>;
}

/// Handles to every store, all backed by the same backend.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Alerts.
    pub alerts: Arc<dyn AlertStore>,
    /// Receipts.
    pub receipts: Arc<dyn ReceiptStore>,
    /// Preferences.
    pub preferences: Arc<dyn PreferenceStore>,
    /// Crime reports.
    pub crimes: Arc<dyn CrimeReportStore>,
}

impl Stores {
    /// Stores over a PostgreSQL pool.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            alerts: Arc::new(AlertRepository::new(pool.clone())),
            receipts: Arc::new(ReceiptRepository::new(pool.clone())),
            preferences: Arc::new(PreferenceRepository::new(pool.clone())),
            crimes: Arc::new(CrimeReportRepository::new(pool)),
        }
    }

    /// Stores sharing one in-memory state.
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            alerts: store.clone(),
            receipts: store.clone(),
            preferences: store.clone(),
            crimes: store,
        }
    }

    /// Open the configured backend, running migrations for PostgreSQL
    /// when enabled.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory stores");
                Ok(Self::memory(MemoryStore::new()))
            }
            StoreBackend::Postgres => {
                let pool = DatabasePool::connect(config).await?.into_pool();
                if config.run_migrations {
                    migration::run_migrations(&pool).await?;
                }
                Ok(Self::postgres(pool))
            }
        }
    }
}
