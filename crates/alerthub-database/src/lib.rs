//! # alerthub-database
//!
//! Store traits for alerts, receipts, preferences and crime reports,
//! with a PostgreSQL implementation (sqlx) and an in-memory one for
//! single-node development and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{AlertStore, CrimeReportStore, PreferenceStore, ReceiptStore, Stores};
