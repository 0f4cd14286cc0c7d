//! Display formatting for terminal output
//!
//! Provides utilities for formatting data models for terminal display as
//! tables and detail views.

pub mod batch;
pub mod dashboard;
pub mod donation;
pub mod donor;
pub mod fund;
pub mod import;
pub mod user;

pub use batch::{format_batch_details, format_batch_list, format_batch_total};
pub use dashboard::format_dashboard;
pub use donation::format_donation_list;
pub use donor::{format_donor_details, format_donor_list};
pub use fund::{format_fund_details, format_fund_list};
pub use import::{format_import_preview, format_import_result};
pub use user::{format_user_details, format_user_list};
