//! Report period value object.

pub mod period;

pub use period::ReportPeriod;
