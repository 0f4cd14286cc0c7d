//! Service layer for Offertory
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, permission checks and cross-entity operations.

pub mod auth;
pub mod bank;
pub mod batch;
pub mod check_image;
pub mod dashboard;
pub mod donation;
pub mod donor;
pub mod fund;
pub mod import;
pub mod user;

pub use auth::{AuthService, LoginOutcome};
pub use bank::BankService;
pub use batch::BatchService;
pub use check_image::CheckImageService;
pub use dashboard::{DashboardService, DashboardTotals};
pub use donation::{AddDonationInput, DonationService, UpdateDonationInput};
pub use donor::DonorService;
pub use fund::{FundService, UpdateFundInput};
pub use import::{ImportLayout, ImportPreview, ImportResult, ImportService, SkippedRow};
pub use user::{CreateUserInput, UpdateProfileInput, UserService};
