//! # alerthub-api
//!
//! HTTP API layer for AlertHub built on Axum.
//!
//! Provides the REST endpoints, the crime-alert WebSocket upgrade, error
//! mapping, and the application wiring shared by the server and the CLI.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::{Application, build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
