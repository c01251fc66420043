//! Route handlers organized by domain.

pub mod alert;
pub mod crime;
pub mod health;
pub mod job;
pub mod report;
pub mod ws;
