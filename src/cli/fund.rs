//! Fund CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_fund_details, format_fund_list};
use crate::error::OffertoryResult;
use crate::models::{FundDetails, UNKNOWN_BANK_FIELD};
use crate::services::{FundService, UpdateFundInput};
use crate::storage::Storage;

/// Fund subcommands
#[derive(Subcommand)]
pub enum FundCommands {
    /// Create a fund
    Create {
        /// Fund name
        name: String,
        #[arg(long)]
        bank: Option<String>,
        #[arg(long)]
        account_name: Option<String>,
        #[arg(long)]
        account_number: Option<String>,
    },
    /// List funds
    List,
    /// Show fund details
    Show {
        /// Fund name or ID
        fund: String,
    },
    /// Edit a fund
    Edit {
        /// Fund name or ID
        fund: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        bank: Option<String>,
        #[arg(long)]
        account_name: Option<String>,
        #[arg(long)]
        account_number: Option<String>,
    },
    /// Delete an unused fund
    Delete {
        /// Fund name or ID
        fund: String,
    },
}

/// Handle a fund command
pub fn handle_fund_command(
    storage: &Storage,
    settings: &Settings,
    cmd: FundCommands,
) -> OffertoryResult<()> {
    let service = FundService::new(storage);

    match cmd {
        FundCommands::Create {
            name,
            bank,
            account_name,
            account_number,
        } => {
            let unknown = || UNKNOWN_BANK_FIELD.to_string();
            let fund = service.create(FundDetails {
                name,
                bank_name: bank.unwrap_or_else(unknown),
                account_name: account_name.unwrap_or_else(unknown),
                account_number: account_number.unwrap_or_else(unknown),
            })?;
            println!("Created fund: {}", fund.name);
            println!("  ID: {}", fund.id);
        }

        FundCommands::List => {
            let funds = service.list()?;
            print!("{}", format_fund_list(&funds, settings.default_fund_id));
        }

        FundCommands::Show { fund } => {
            let found = service.find(&fund)?;
            let count = storage.funds.donation_count(found.id)?;
            print!("{}", format_fund_details(&found, count));
        }

        FundCommands::Edit {
            fund,
            name,
            bank,
            account_name,
            account_number,
        } => {
            let found = service.find(&fund)?;
            if name.is_none() && bank.is_none() && account_name.is_none() && account_number.is_none()
            {
                println!("No changes specified.");
                return Ok(());
            }
            let updated = service.update(
                found.id,
                UpdateFundInput {
                    name,
                    bank_name: bank,
                    account_name,
                    account_number,
                },
            )?;
            println!("Updated fund: {}", updated.name);
        }

        FundCommands::Delete { fund } => {
            let found = service.find(&fund)?;
            let deleted = service.delete(found.id, settings.default_fund_id)?;
            println!("Deleted fund: {}", deleted.name);
        }
    }

    Ok(())
}
