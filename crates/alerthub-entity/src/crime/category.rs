//! Crime category and investigation status enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of crime reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "crime_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrimeCategory {
    Theft,
    Assault,
    Vandalism,
    Burglary,
    Homicide,
    Robbery,
    DrugOffense,
    Cybercrime,
    Other,
}

impl CrimeCategory {
    /// Every category.
    pub const ALL: [CrimeCategory; 9] = [
        Self::Theft,
        Self::Assault,
        Self::Vandalism,
        Self::Burglary,
        Self::Homicide,
        Self::Robbery,
        Self::DrugOffense,
        Self::Cybercrime,
        Self::Other,
    ];

    /// Stored code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Theft => "THEFT",
            Self::Assault => "ASSAULT",
            Self::Vandalism => "VANDALISM",
            Self::Burglary => "BURGLARY",
            Self::Homicide => "HOMICIDE",
            Self::Robbery => "ROBBERY",
            Self::DrugOffense => "DRUG_OFFENSE",
            Self::Cybercrime => "CYBERCRIME",
            Self::Other => "OTHER",
        }
    }

    /// Human readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Theft => "Theft",
            Self::Assault => "Assault",
            Self::Vandalism => "Vandalism",
            Self::Burglary => "Burglary",
            Self::Homicide => "Homicide",
            Self::Robbery => "Robbery",
            Self::DrugOffense => "Drug Offense",
            Self::Cybercrime => "Cybercrime",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for CrimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Investigation status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "crime_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrimeStatus {
    #[default]
    Pending,
    UnderInvestigation,
    Resolved,
    Closed,
    Rejected,
}

impl CrimeStatus {
    /// Every status.
    pub const ALL: [CrimeStatus; 5] = [
        Self::Pending,
        Self::UnderInvestigation,
        Self::Resolved,
        Self::Closed,
        Self::Rejected,
    ];

    /// Stored code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::UnderInvestigation => "UNDER_INVESTIGATION",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Human readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::UnderInvestigation => "Under Investigation",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for CrimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
