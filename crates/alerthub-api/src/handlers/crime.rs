//! Crime report handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use alerthub_entity::crime::{CreateCrimeReport, CrimeReport};

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/crime-reports: also texts phone holders and notifies
/// live dashboards
pub async fn create_crime_report(
    State(state): State<AppState>,
    Json(input): Json<CreateCrimeReport>,
) -> Result<(StatusCode, Json<ApiResponse<CrimeReport>>), ApiError> {
    let report = state.crimes.report_crime(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(report))))
}
