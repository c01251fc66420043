//! Route definitions for the AlertHub HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket endpoint lives at
//! `/ws/crime-alerts`.

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes, threading `AppState` through
/// every handler.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(alert_routes())
        .merge(crime_routes())
        .merge(report_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws/crime-alerts", get(handlers::ws::crime_alerts));

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .with_state(state)
}

/// Alert lifecycle and read tracking
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/alerts", post(handlers::alert::create_alert))
        .route("/alerts/{id}/approve", post(handlers::alert::approve_alert))
        .route("/alerts/{id}/dispatch", post(handlers::alert::dispatch_alert))
        .route(
            "/alerts/{id}/views/{user_id}",
            post(handlers::alert::mark_viewed),
        )
        .route(
            "/users/{id}/unread-count",
            get(handlers::alert::unread_count),
        )
}

/// Crime report intake
fn crime_routes() -> Router<AppState> {
    Router::new().route(
        "/crime-reports",
        post(handlers::crime::create_crime_report),
    )
}

/// Report generation and job status
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports/{year}/{month}", post(handlers::report::queue_report))
        .route("/jobs/{id}", get(handlers::job::get_job))
}

/// Health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
