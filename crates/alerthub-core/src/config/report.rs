//! Periodic report configuration.

use serde::{Deserialize, Serialize};

/// Monthly crime report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory generated documents are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Name used in document titles, subjects and attachment names.
    #[serde(default = "default_brand")]
    pub brand: String,
    /// Area name used in the summary sentence.
    #[serde(default = "default_area_name")]
    pub area_name: String,
    /// Number of locations listed in the hotspot table.
    #[serde(default = "default_top_locations")]
    pub top_locations: usize,
    /// Chart width in pixels.
    #[serde(default = "default_chart_width")]
    pub chart_width: u32,
    /// Chart height in pixels.
    #[serde(default = "default_chart_height")]
    pub chart_height: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            brand: default_brand(),
            area_name: default_area_name(),
            top_locations: default_top_locations(),
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
        }
    }
}

fn default_output_dir() -> String {
    "data/crime_reports".to_string()
}

fn default_brand() -> String {
    "KingsPark".to_string()
}

fn default_area_name() -> String {
    "Kings Park".to_string()
}

fn default_top_locations() -> usize {
    10
}

fn default_chart_width() -> u32 {
    640
}

fn default_chart_height() -> u32 {
    360
}
