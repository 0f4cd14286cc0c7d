//! Bank settings CLI commands

use clap::Subcommand;

use crate::error::OffertoryResult;
use crate::models::BankSettings;
use crate::services::BankService;
use crate::session::SessionHolder;
use crate::storage::Storage;

/// Bank subcommands
#[derive(Subcommand)]
pub enum BankCommands {
    /// Show the deposit bank settings
    Show,
    /// Update the deposit bank settings (administrators only)
    Set {
        #[arg(long)]
        bank_name: Option<String>,
        #[arg(long)]
        routing_number: Option<String>,
        #[arg(long)]
        account_name: Option<String>,
        #[arg(long)]
        account_number: Option<String>,
    },
}

/// Handle a bank command
pub fn handle_bank_command(
    storage: &Storage,
    session: &SessionHolder,
    cmd: BankCommands,
) -> OffertoryResult<()> {
    let service = BankService::new(storage);

    match cmd {
        BankCommands::Show => match service.get()? {
            Some(bank) => print_bank(&bank),
            None => {
                println!("Bank settings not configured.");
                println!("Set them with: offertory bank set --bank-name ...");
            }
        },

        BankCommands::Set {
            bank_name,
            routing_number,
            account_name,
            account_number,
        } => {
            session.require_admin()?;
            let current = service.get()?.unwrap_or_default();
            let saved = service.save(BankSettings {
                bank_name: bank_name.unwrap_or(current.bank_name),
                routing_number: routing_number.unwrap_or(current.routing_number),
                account_name: account_name.unwrap_or(current.account_name),
                account_number: account_number.unwrap_or(current.account_number),
            })?;
            println!("Bank settings saved.");
            print_bank(&saved);
        }
    }

    Ok(())
}

fn print_bank(bank: &BankSettings) {
    println!("Bank:            {}", bank.bank_name);
    println!("Routing number:  {}", bank.routing_number);
    println!("Account name:    {}", bank.account_name);
    println!("Account number:  {}", bank.masked_account_number());
}
