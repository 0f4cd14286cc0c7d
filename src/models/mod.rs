//! Core data models for Offertory
//!
//! This module contains the data structures of the donation-tracking domain:
//! users, donors, funds, batches, donations, check images and bank settings.

pub mod bank;
pub mod batch;
pub mod check_image;
pub mod donation;
pub mod donor;
pub mod fund;
pub mod ids;
pub mod money;
pub mod period;
pub mod user;

pub use bank::BankSettings;
pub use batch::{Batch, BatchNumbering, BatchStatus, BatchSummary};
pub use check_image::CheckImage;
pub use donation::{Donation, DonationDetails, DonationLine, DonorTotal, FundTotal};
pub use donor::{Alias, Donor, DonorName};
pub use fund::{Fund, FundDetails, DEFAULT_FUND_NAME, UNKNOWN_BANK_FIELD};
pub use ids::{AliasId, BatchId, CheckImageId, DonationId, DonorId, FundId, UserId};
pub use money::Money;
pub use period::ReportingPeriod;
pub use user::{NewUser, Role, User};
