//! # alerthub-core
//!
//! Core crate for AlertHub. Contains configuration schemas, domain events,
//! the task-queue seam shared by the dispatch and worker layers, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other AlertHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
