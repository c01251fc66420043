//! Job handlers for every queued job type.

pub mod fanout;
pub mod report;
pub mod sms;

pub use fanout::AlertFanoutHandler;
pub use report::MonthlyReportHandler;
pub use sms::SmsDeliveryHandler;

use alerthub_entity::job::{Job, JobPayload};

use crate::executor::JobExecutionError;

/// Decode the typed payload of `job`. A malformed payload never succeeds.
pub(crate) fn payload(job: &Job) -> Result<JobPayload, JobExecutionError> {
    JobPayload::from_value(&job.payload).map_err(|e| JobExecutionError::Permanent(e.to_string()))
}
