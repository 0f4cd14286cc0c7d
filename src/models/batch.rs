//! Batch model
//!
//! A batch groups the checks entered together for one deposit. Each batch
//! gets a human-readable number when it is created and moves one way from
//! open to closed.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BatchId, UserId};
use super::money::Money;

/// Status of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    #[default]
    Open,
    Closed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

impl ToSql for BatchStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BatchStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Self::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown batch status '{}'", s).into()))
    }
}

/// How new batch numbers are assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchNumbering {
    /// `YYYYMMDD-NN`, sequence restarting for every batch date
    #[default]
    DatePrefixed,
    /// `1`, `2`, `3`, ... across all dates
    Sequential,
}

impl BatchNumbering {
    /// Compute the next batch number given the numbers already stored.
    ///
    /// Date-prefixed numbers take the highest suffix carrying the same date
    /// prefix plus one, so a deleted batch never lets a number repeat.
    /// Sequential numbers take the highest numeric number plus one and
    /// ignore numbers produced by the other scheme.
    pub fn next_number<S: AsRef<str>>(&self, date: NaiveDate, existing: &[S]) -> String {
        match self {
            Self::DatePrefixed => {
                let prefix = date_prefix(date);
                let next = existing
                    .iter()
                    .filter_map(|n| {
                        n.as_ref()
                            .strip_prefix(prefix.as_str())
                            .and_then(|rest| rest.strip_prefix('-'))
                            .and_then(|suffix| suffix.parse::<u32>().ok())
                    })
                    .max()
                    .unwrap_or(0)
                    + 1;
                format!("{}-{:02}", prefix, next)
            }
            Self::Sequential => {
                let next = existing
                    .iter()
                    .filter_map(|n| n.as_ref().parse::<u64>().ok())
                    .max()
                    .unwrap_or(0)
                    + 1;
                next.to_string()
            }
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "date_prefixed" | "date" => Some(Self::DatePrefixed),
            "sequential" | "global" => Some(Self::Sequential),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DatePrefixed => "date_prefixed",
            Self::Sequential => "sequential",
        }
    }
}

impl fmt::Display for BatchNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `YYYYMMDD` prefix used by date-prefixed batch numbers
pub fn date_prefix(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// A dated grouping of donations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub batch_number: String,
    pub batch_date: NaiveDate,
    pub created_by: UserId,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
}

impl Batch {
    pub fn is_open(&self) -> bool {
        self.status == BatchStatus::Open
    }

    /// Transition `open -> closed`
    pub fn close(&mut self) -> Result<(), String> {
        match self.status {
            BatchStatus::Open => {
                self.status = BatchStatus::Closed;
                Ok(())
            }
            BatchStatus::Closed => Err(format!("Batch {} is already closed", self.batch_number)),
        }
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Batch {} ({})", self.batch_number, self.batch_date)
    }
}

/// A batch together with its running total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub batch: Batch,
    pub total: Money,
    pub donation_count: i64,
}
