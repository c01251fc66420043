//! PostgreSQL implementations of the store traits.

pub mod alert;
pub mod crime;
pub mod preference;
pub mod receipt;

pub use alert::AlertRepository;
pub use crime::CrimeReportRepository;
pub use preference::PreferenceRepository;
pub use receipt::ReceiptRepository;
