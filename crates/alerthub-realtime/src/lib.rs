//! # alerthub-realtime
//!
//! Fire-and-forget broadcast to live dashboard clients:
//!
//! - connection handles with bounded outbound buffers
//! - topic groups a connection joins and leaves
//! - the bridge turning domain events into topic messages
//!
//! Nothing is stored; a client only sees messages published while it
//! is joined.

pub mod bridge;
pub mod bus;
pub mod channel;
pub mod connection;
pub mod message;

pub use bridge::EventBridge;
pub use bus::BroadcastBus;
pub use connection::handle::{ConnectionHandle, ConnectionId};
pub use message::BroadcastMessage;
