//! Strongly-typed ID wrappers for all entity types
//!
//! Rows are keyed by SQLite integer primary keys. Wrapping them in newtypes
//! prevents accidentally passing a donor id where a batch id is expected.

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw row id
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the underlying row id
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            /// Accepts both the bare number and the prefixed display form
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                self.0.to_sql()
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

define_id!(UserId, "usr-");
define_id!(DonorId, "dnr-");
define_id!(AliasId, "als-");
define_id!(FundId, "fnd-");
define_id!(BatchId, "bat-");
define_id!(DonationId, "don-");
define_id!(CheckImageId, "img-");

impl FundId {
    /// The fund seeded at first run ("General Fund")
    pub const DEFAULT: FundId = FundId(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(DonorId::new(12).to_string(), "dnr-12");
        assert_eq!(BatchId::new(3).to_string(), "bat-3");
    }

    #[test]
    fn test_id_parse_accepts_prefix() {
        assert_eq!("dnr-12".parse::<DonorId>().unwrap(), DonorId::new(12));
        assert_eq!("12".parse::<DonorId>().unwrap(), DonorId::new(12));
        assert!("bat-x".parse::<BatchId>().is_err());
    }

    #[test]
    fn test_id_serialization() {
        let id = FundId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back: FundId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_default_fund() {
        assert_eq!(FundId::DEFAULT.value(), 1);
    }
}
