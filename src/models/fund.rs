//! Fund model
//!
//! A fund is the ledger a donation is credited to, with the bank account it
//! is deposited into.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::FundId;

/// Placeholder bank metadata for funds created by an import
pub const UNKNOWN_BANK_FIELD: &str = "Unknown";

/// Name of the fund seeded at first run
pub const DEFAULT_FUND_NAME: &str = "General Fund";

/// A destination account/ledger for donations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    pub id: FundId,
    pub name: String,
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
}

impl fmt::Display for Fund {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Fields for creating or replacing a fund
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundDetails {
    pub name: String,
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
}

impl FundDetails {
    /// Fund with placeholder bank metadata
    pub fn with_unknown_bank(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bank_name: UNKNOWN_BANK_FIELD.into(),
            account_name: UNKNOWN_BANK_FIELD.into(),
            account_number: UNKNOWN_BANK_FIELD.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Fund name cannot be empty".into());
        }
        if name.len() > 100 {
            return Err(format!("Fund name too long ({} chars, max 100)", name.len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_bank() {
        let details = FundDetails::with_unknown_bank("Missions");
        assert_eq!(details.bank_name, "Unknown");
        assert_eq!(details.account_name, "Unknown");
        assert_eq!(details.account_number, "Unknown");
        assert!(details.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(FundDetails::with_unknown_bank(" ").validate().is_err());
        assert!(FundDetails::with_unknown_bank("a".repeat(101)).validate().is_err());
    }
}
