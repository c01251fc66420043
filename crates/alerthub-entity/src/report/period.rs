//! Calendar month a report covers.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use alerthub_core::error::AppError;
use alerthub_core::result::AppResult;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A (year, month) pair identifying one monthly report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportPeriod {
    year: i32,
    month: u32,
}

impl ReportPeriod {
    /// Create a period, rejecting out-of-range months.
    pub fn new(year: i32, month: u32) -> AppResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(AppError::validation(format!(
                "Month must be between 1 and 12, got {month}"
            )));
        }
        if !(1970..=9999).contains(&year) {
            return Err(AppError::validation(format!("Year {year} is out of range")));
        }
        Ok(Self { year, month })
    }

    /// The calendar month before the one containing `today`.
    pub fn previous_month(today: NaiveDate) -> Self {
        if today.month() == 1 {
            Self {
                year: today.year() - 1,
                month: 12,
            }
        } else {
            Self {
                year: today.year(),
                month: today.month() - 1,
            }
        }
    }

    /// Resolve optional CLI/job arguments, defaulting to the previous month.
    ///
    /// A month without a year uses the current year.
    pub fn resolve(year: Option<i32>, month: Option<u32>, today: NaiveDate) -> AppResult<Self> {
        match (year, month) {
            (None, None) => Ok(Self::previous_month(today)),
            (Some(year), Some(month)) => Self::new(year, month),
            (None, Some(month)) => Self::new(today.year(), month),
            (Some(_), None) => Err(AppError::validation("A year requires a month")),
        }
    }

    /// Year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month, 1-based.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// English month name.
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// First day of the month.
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month.
    pub fn end_date(&self) -> NaiveDate {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.and_then(|d| d.pred_opt()).unwrap_or(NaiveDate::MAX)
    }

    /// Number of days in the month.
    pub fn days_in_month(&self) -> u32 {
        self.end_date().day()
    }

    /// Half-open UTC window `[first day 00:00, day after last day 00:00)`,
    /// which covers the whole last day.
    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.from_utc_datetime(&self.start_date().and_time(NaiveTime::MIN));
        let end = Utc.from_utc_datetime(&(self.end_date() + Duration::days(1)).and_time(NaiveTime::MIN));
        (start, end)
    }

    /// Stable file stem, e.g. `crime_report_2024_05`.
    pub fn file_stem(&self) -> String {
        format!("crime_report_{:04}_{:02}", self.year, self.month)
    }

    /// `"May 2024"`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
