//! Request DTOs.

use serde::Deserialize;

/// Query string of `POST /api/reports/{year}/{month}`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReportQuery {
    /// Mail the report once generated.
    #[serde(default)]
    pub send: bool,
}
