//! Reporting periods for "to-date" totals
//!
//! Period boundaries are derived from a reference date, normally today's
//! local date.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A period running from a computed start date up to now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingPeriod {
    MonthToDate,
    QuarterToDate,
    YearToDate,
}

impl ReportingPeriod {
    /// All periods, shortest first
    pub fn all() -> [Self; 3] {
        [Self::MonthToDate, Self::QuarterToDate, Self::YearToDate]
    }

    /// First day of the period containing `today`
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        let (year, month) = match self {
            Self::MonthToDate => (today.year(), today.month()),
            Self::QuarterToDate => (today.year(), ((today.month() - 1) / 3) * 3 + 1),
            Self::YearToDate => (today.year(), 1),
        };
        // Day 1 of a month taken from a valid date always exists
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MonthToDate => "Month to date",
            Self::QuarterToDate => "Quarter to date",
            Self::YearToDate => "Year to date",
        }
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive start and end of a calendar year
pub fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}
