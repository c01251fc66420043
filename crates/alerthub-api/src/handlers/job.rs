//! Job status handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use alerthub_core::error::AppError;
use alerthub_entity::job::Job;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Job>>, ApiError> {
    let job = state
        .queue
        .get(id)
        .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))?;
    Ok(Json(ApiResponse::ok(job)))
}
