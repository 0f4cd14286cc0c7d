//! Donor and alias models
//!
//! Donors are matched by exact first/last name. Aliases record alternate
//! spellings and are only consulted by explicit alias lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AliasId, DonorId};

/// A named contributor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    pub id: DonorId,
    pub first_name: String,
    pub last_name: String,

    /// Excluded from statement generation when set
    pub opt_out: bool,

    pub created_at: DateTime<Utc>,
}

impl Donor {
    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// "Last, First"
    pub fn sort_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

impl fmt::Display for Donor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// A first/last name pair, trimmed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DonorName {
    pub first_name: String,
    pub last_name: String,
}

impl DonorName {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.is_empty() && self.last_name.is_empty() {
            return Err("Donor name cannot be empty".into());
        }
        if self.last_name.is_empty() {
            return Err("Donor last name cannot be empty".into());
        }
        if self.first_name.len() > 100 || self.last_name.len() > 100 {
            return Err("Donor name too long (max 100 chars)".into());
        }
        Ok(())
    }
}

impl fmt::Display for DonorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Alternate spelling of a donor's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub id: AliasId,
    pub donor_id: DonorId,
    pub first_name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_donor_name_trims() {
        let name = DonorName::new("  John ", " Smith");
        assert_eq!(name.first_name, "John");
        assert_eq!(name.last_name, "Smith");
        assert_eq!(name.to_string(), "John Smith");
    }

    #[test]
    fn test_donor_name_validation() {
        assert!(DonorName::new("John", "Smith").validate().is_ok());
        assert!(DonorName::new("", "Smith").validate().is_ok());
        assert!(DonorName::new("John", "").validate().is_err());
        assert!(DonorName::new("", "").validate().is_err());
    }

    #[test]
    fn test_names() {
        let donor = Donor {
            id: DonorId::new(1),
            first_name: "Mary".into(),
            last_name: "Jones".into(),
            opt_out: false,
            created_at: Utc::now(),
        };
        assert_eq!(donor.full_name(), "Mary Jones");
        assert_eq!(donor.sort_name(), "Jones, Mary");
    }
}
