//! Notification preference entities.

pub mod filter;
pub mod model;

pub use filter::RecipientFilter;
pub use model::NotificationPreference;
