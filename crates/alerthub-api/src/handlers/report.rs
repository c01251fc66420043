//! Monthly report handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use alerthub_entity::job::JobPayload;
use alerthub_entity::report::ReportPeriod;

use crate::dto::request::ReportQuery;
use crate::dto::response::{ApiResponse, JobAccepted};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/reports/{year}/{month}?send=true: queues a report job
pub async fn queue_report(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<ReportQuery>,
) -> Result<(StatusCode, Json<ApiResponse<JobAccepted>>), ApiError> {
    let period = ReportPeriod::new(year, month)?;
    let payload = JobPayload::MonthlyReport {
        year: Some(period.year()),
        month: Some(period.month()),
        send: query.send,
    };
    let job = state
        .queue
        .enqueue_job(payload.job_type(), payload.to_value()?)?;

    tracing::info!(period = %period, job_id = %job.id, send = query.send, "Report job queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::ok(JobAccepted {
            job_id: job.id,
            job_type: job.job_type,
            status: job.status,
        })),
    ))
}
