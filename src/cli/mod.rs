//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod auth;
pub mod backup;
pub mod bank;
pub mod batch;
pub mod config;
pub mod dashboard;
pub mod donation;
pub mod donor;
pub mod export;
pub mod fund;
pub mod import;
pub mod init;
pub mod report;
pub mod user;

pub use auth::{authenticate, handle_login_command, handle_passwd_command};
pub use backup::{handle_backup_command, BackupCommands};
pub use bank::{handle_bank_command, BankCommands};
pub use batch::{handle_batch_command, BatchCommands};
pub use config::{handle_config_command, ConfigCommands};
pub use dashboard::handle_dashboard_command;
pub use donation::{handle_donation_command, DonationCommands};
pub use donor::{handle_donor_command, DonorCommands};
pub use export::{handle_export_command, ExportCommands};
pub use fund::{handle_fund_command, FundCommands};
pub use import::handle_import_command;
pub use init::handle_init_command;
pub use report::{handle_report_command, ReportCommands};
pub use user::{handle_user_command, UserCommands};

use chrono::NaiveDate;

use crate::error::{OffertoryError, OffertoryResult};
use crate::models::Money;
use crate::services::import::parse_import_date;

/// Parse a date argument (`MM/DD/YYYY` or `YYYY-MM-DD`)
pub fn parse_date(s: &str) -> OffertoryResult<NaiveDate> {
    parse_import_date(s).ok_or_else(|| {
        OffertoryError::Validation(format!(
            "Invalid date: '{}'. Use MM/DD/YYYY or YYYY-MM-DD",
            s
        ))
    })
}

/// Parse an optional date argument
pub fn parse_optional_date(s: Option<&str>) -> OffertoryResult<Option<NaiveDate>> {
    s.map(parse_date).transpose()
}

/// Parse an amount argument such as "125", "125.50" or "$1,250.00"
pub fn parse_money(s: &str) -> OffertoryResult<Money> {
    Money::parse(s).map_err(|e| {
        OffertoryError::Validation(format!(
            "Invalid amount: '{}'. Use a format like '125.00'. Error: {}",
            s, e
        ))
    })
}
