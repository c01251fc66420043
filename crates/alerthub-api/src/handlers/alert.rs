//! Alert handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use alerthub_dispatch::DispatchAck;
use alerthub_entity::alert::{Alert, CreateAlert};

use crate::dto::response::{ApiResponse, CountResponse, MessageResponse, ViewResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/alerts
pub async fn create_alert(
    State(state): State<AppState>,
    Json(input): Json<CreateAlert>,
) -> Result<(StatusCode, Json<ApiResponse<Alert>>), ApiError> {
    let alert = state.dispatch.create_alert(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(alert))))
}

/// POST /api/alerts/{id}/approve
pub async fn approve_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.dispatch.approve(id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Alert approved".to_string(),
    })))
}

/// POST /api/alerts/{id}/dispatch: queues the fan-out and returns at once
pub async fn dispatch_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<DispatchAck>>), ApiError> {
    let ack = state.dispatch.dispatch(id).await?;
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::ok(ack))))
}

/// POST /api/alerts/{id}/views/{user_id}
pub async fn mark_viewed(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<ViewResponse>>, ApiError> {
    let first_view = state.dispatch.mark_viewed(id, user_id).await?;
    Ok(Json(ApiResponse::ok(ViewResponse { first_view })))
}

/// GET /api/users/{id}/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.dispatch.unread_count(user_id).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}
