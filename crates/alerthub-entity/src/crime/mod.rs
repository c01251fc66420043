//! Crime report entities, the data source of the monthly report.

pub mod category;
pub mod model;

pub use category::{CrimeCategory, CrimeStatus};
pub use model::{CreateCrimeReport, CrimeReport};
