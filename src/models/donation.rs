//! Donation model
//!
//! One check (or cash gift) from one donor, credited to one fund, entered in
//! one batch.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{BatchId, CheckImageId, DonationId, DonorId, FundId};
use super::money::Money;

/// A single donation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    pub donor_id: DonorId,
    pub batch_id: BatchId,
    pub fund_id: FundId,
    pub check_number: String,
    pub amount: Money,
    pub check_date: NaiveDate,
    pub check_image_id: Option<CheckImageId>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating or replacing a donation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationDetails {
    pub donor_id: DonorId,
    pub batch_id: BatchId,
    pub fund_id: FundId,
    pub check_number: String,
    pub amount: Money,
    pub check_date: NaiveDate,
}

impl DonationDetails {
    pub fn validate(&self) -> Result<(), String> {
        if self.amount.is_negative() {
            return Err(format!("Donation amount cannot be negative: {}", self.amount));
        }
        if self.check_number.len() > 32 {
            return Err(format!(
                "Check number too long ({} chars, max 32)",
                self.check_number.len()
            ));
        }
        Ok(())
    }
}

/// A donation joined with the names a report needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationLine {
    pub donation: Donation,
    pub donor_first_name: String,
    pub donor_last_name: String,
    pub fund_name: String,
}

impl DonationLine {
    pub fn donor_name(&self) -> String {
        format!("{} {}", self.donor_first_name, self.donor_last_name)
    }
}

/// Amount booked to one fund over a range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundTotal {
    pub fund_id: FundId,
    pub fund_name: String,
    pub total: Money,
    pub count: i64,
}

/// Amount given by one donor over a range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonorTotal {
    pub donor_id: DonorId,
    pub first_name: String,
    pub last_name: String,
    pub total: Money,
    pub count: i64,
}
