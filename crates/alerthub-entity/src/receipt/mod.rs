//! Delivery receipt entities.

pub mod channel;
pub mod model;

pub use channel::DeliveryChannel;
pub use model::Receipt;
