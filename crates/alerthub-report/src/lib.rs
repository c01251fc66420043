//! # alerthub-report
//!
//! Monthly crime report pipeline. A run aggregates the month's crime
//! reports, renders three charts, assembles a self-contained HTML
//! document at a path derived from the period, and optionally mails it
//! to every user opted in to email.

pub mod aggregate;
pub mod chart;
pub mod distribute;
pub mod document;
pub mod pipeline;

pub use aggregate::{Aggregator, CountRow, DailyCount, ReportStats};
pub use chart::{Chart, ChartRenderer};
pub use distribute::ReportDistributor;
pub use document::{DocumentAssembler, RenderedCharts, ReportDocument};
pub use pipeline::{ReportPipeline, ReportRun};
