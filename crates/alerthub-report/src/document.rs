//! HTML report assembly.
//!
//! The report is a single HTML file rather than a PDF. Charts are
//! embedded as base64 PNG data URIs and carry no axis or slice labels;
//! each table row shows the swatch color of its chart segment instead.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use alerthub_core::config::ReportConfig;
use alerthub_core::error::{AppError, ErrorKind};
use alerthub_core::result::AppResult;
use alerthub_entity::report::ReportPeriod;

use crate::aggregate::{CountRow, ReportStats};
use crate::chart::{Chart, palette_color};

const SAFETY_TIPS: &str = "Stay vigilant in your community. Report suspicious activities. \
Keep emergency numbers handy. Install adequate lighting around your property. \
Join or form a neighborhood watch group.";

/// Charts produced for one run. A missing chart is left out of the
/// document.
#[derive(Debug, Clone, Default)]
pub struct RenderedCharts {
    /// Category pie.
    pub category: Option<Chart>,
    /// Status bar chart.
    pub status: Option<Chart>,
    /// Daily trend line.
    pub daily: Option<Chart>,
}

/// A generated report on disk.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    /// The month covered.
    pub period: ReportPeriod,
    /// Document title, also used as the mail subject.
    pub title: String,
    /// Where the document was written.
    pub path: PathBuf,
    /// The figures it shows.
    pub stats: ReportStats,
    /// Charts that failed to render.
    pub omitted_charts: Vec<String>,
}

/// Builds and writes report documents.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    brand: String,
    area_name: String,
    output_dir: PathBuf,
}

impl DocumentAssembler {
    /// Create an assembler from the report settings.
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            brand: config.brand.clone(),
            area_name: config.area_name.clone(),
            output_dir: PathBuf::from(&config.output_dir),
        }
    }

    /// Brand prefix used in titles and attachment names.
    pub fn brand(&self) -> &str {
        &self.brand
    }

    /// `"<brand> Crime Report - <Month> <Year>"`.
    pub fn title(&self, period: ReportPeriod) -> String {
        format!("{} Crime Report - {}", self.brand, period.display_name())
    }

    /// Deterministic location of a period's document.
    pub fn path_for(&self, period: ReportPeriod) -> PathBuf {
        self.output_dir.join(format!("{}.html", period.file_stem()))
    }

    /// Render the document.
    pub fn render_html(
        &self,
        stats: &ReportStats,
        charts: &RenderedCharts,
        generated_on: NaiveDate,
    ) -> String {
        let title = escape(&self.title(stats.period));
        let mut html = String::with_capacity(16 * 1024);

        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
             <h1>{title}</h1>\n<p class=\"generated\">Report Generated: {}</p>\n",
            generated_on.format("%d %B %Y")
        );

        let _ = write!(
            html,
            "<p>This report provides an overview of crimes reported in the {} area during {}. \
             A total of {} crimes were reported during this period.</p>\n",
            escape(&self.area_name),
            stats.period.display_name(),
            stats.total
        );

        html.push_str("<h2>Crimes by Category</h2>\n");
        push_chart(&mut html, charts.category.as_ref());
        push_share_table(&mut html, "Category", &stats.by_category, stats);

        html.push_str("<h2>Crime Status</h2>\n");
        push_chart(&mut html, charts.status.as_ref());
        push_share_table(&mut html, "Status", &stats.by_status, stats);

        html.push_str("<h2>Daily Crime Trend</h2>\n");
        push_chart(&mut html, charts.daily.as_ref());

        html.push_str("<h2>Crime Hotspots</h2>\n");
        if stats.top_locations.is_empty() {
            html.push_str("<p>No location data available</p>\n");
        } else {
            html.push_str("<table>\n<tr><th>Location</th><th>Number of Crimes</th></tr>\n");
            for row in &stats.top_locations {
                let _ = writeln!(
                    html,
                    "<tr><td>{}</td><td>{}</td></tr>",
                    escape(&row.label),
                    row.count
                );
            }
            html.push_str("</table>\n");
        }

        let _ = write!(
            html,
            "<p class=\"tips\"><strong>Safety Tips:</strong> {SAFETY_TIPS}</p>\n</body>\n</html>\n"
        );
        html
    }

    /// Write the document, replacing any earlier version for the period.
    pub async fn write(&self, period: ReportPeriod, html: &str) -> AppResult<PathBuf> {
        let path = self.path_for(period);
        ensure_parent(&path).await?;
        tokio::fs::write(&path, html).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write report {}", path.display()),
                e,
            )
        })?;
        info!(period = %period, path = %path.display(), "Report document written");
        Ok(path)
    }
}

async fn ensure_parent(path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create {}", parent.display()),
                e,
            )
        })?;
    }
    Ok(())
}

fn push_chart(html: &mut String, chart: Option<&Chart>) {
    if let Some(chart) = chart {
        let _ = writeln!(
            html,
            "<img src=\"{}\" alt=\"{}\">",
            chart.data_uri(),
            escape(&chart.title)
        );
    }
}

fn push_share_table(html: &mut String, heading: &str, rows: &[CountRow], stats: &ReportStats) {
    let _ = writeln!(
        html,
        "<table>\n<tr><th>{heading}</th><th>Count</th><th>Percentage</th></tr>"
    );
    for (i, row) in rows.iter().enumerate() {
        let [r, g, b] = palette_color(i);
        let _ = writeln!(
            html,
            "<tr><td><span class=\"swatch\" style=\"background:#{r:02x}{g:02x}{b:02x}\"></span>{}</td>\
             <td>{}</td><td>{}</td></tr>",
            escape(&row.label),
            row.count,
            stats.percentage(row.count)
        );
    }
    html.push_str("</table>\n");
}

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;margin:2em;color:#222}\
h1{text-align:center}h2{margin-top:1.5em}\
table{border-collapse:collapse;margin:1em 0}\
th{background:#808080;color:#f5f5f5;text-align:center}\
th,td{border:1px solid #000;padding:4px 10px}\
td{background:#f5f5dc}\
.swatch{display:inline-block;width:10px;height:10px;margin-right:6px}\
.generated{text-align:center}.tips{margin-top:2em}";
