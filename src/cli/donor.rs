//! Donor CLI commands
//!
//! Donors are addressed by `dnr-` id, `"Last, First"` or `"First Last"`.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_donor_details, format_donor_list};
use crate::error::{OffertoryError, OffertoryResult};
use crate::models::AliasId;
use crate::services::{DonationService, DonorService};
use crate::storage::Storage;

/// Donor subcommands
#[derive(Subcommand)]
pub enum DonorCommands {
    /// Add a donor
    Add {
        /// First name
        first: String,
        /// Last name
        last: String,
    },
    /// List donors, optionally filtered by name
    List {
        /// Case-insensitive name search
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a donor with aliases and giving history
    Show {
        /// Donor ID or name
        donor: String,
    },
    /// Rename a donor
    Rename {
        /// Donor ID or name
        donor: String,
        /// New first name
        first: String,
        /// New last name
        last: String,
    },
    /// Exclude a donor from yearly statements
    OptOut {
        /// Donor ID or name
        donor: String,
        /// Include the donor again
        #[arg(long)]
        undo: bool,
    },
    /// Delete a donor without donations
    Delete {
        /// Donor ID or name
        donor: String,
    },
    /// Manage alternate names
    #[command(subcommand)]
    Alias(AliasCommands),
}

/// Alias subcommands
#[derive(Subcommand)]
pub enum AliasCommands {
    /// Record an alternate name for a donor
    Add {
        /// Donor ID or name
        donor: String,
        first: String,
        last: String,
    },
    /// List a donor's aliases
    List {
        /// Donor ID or name
        donor: String,
    },
    /// Remove an alias
    Remove {
        /// Alias ID
        alias: String,
    },
    /// Find the donor owning an alias
    Find { first: String, last: String },
}

/// Handle a donor command
pub fn handle_donor_command(
    storage: &Storage,
    settings: &Settings,
    cmd: DonorCommands,
) -> OffertoryResult<()> {
    let service = DonorService::new(storage);

    match cmd {
        DonorCommands::Add { first, last } => {
            let donor = service.create(&first, &last)?;
            println!("Created donor: {}", donor.full_name());
            println!("  ID: {}", donor.id);
        }

        DonorCommands::List { search } => {
            let donors = match search {
                Some(query) => service.search(&query)?,
                None => service.list()?,
            };
            print!("{}", format_donor_list(&donors));
        }

        DonorCommands::Show { donor } => {
            let found = service.find(&donor)?;
            let aliases = service.list_aliases(found.id)?;
            let donations = DonationService::new(storage, settings).list_by_donor(found.id)?;
            print!(
                "{}",
                format_donor_details(&found, &aliases, &donations, &settings.currency_symbol)
            );
        }

        DonorCommands::Rename { donor, first, last } => {
            let found = service.find(&donor)?;
            let renamed = service.rename(found.id, &first, &last)?;
            println!("Renamed {} to {}", found.full_name(), renamed.full_name());
        }

        DonorCommands::OptOut { donor, undo } => {
            let found = service.find(&donor)?;
            let updated = service.set_opt_out(found.id, !undo)?;
            if updated.opt_out {
                println!("{} will not receive statements", updated.full_name());
            } else {
                println!("{} will receive statements", updated.full_name());
            }
        }

        DonorCommands::Delete { donor } => {
            let found = service.find(&donor)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted donor: {}", deleted.full_name());
        }

        DonorCommands::Alias(cmd) => handle_alias_command(&service, cmd)?,
    }

    Ok(())
}

fn handle_alias_command(service: &DonorService<'_>, cmd: AliasCommands) -> OffertoryResult<()> {
    match cmd {
        AliasCommands::Add { donor, first, last } => {
            let found = service.find(&donor)?;
            let alias = service.add_alias(found.id, &first, &last)?;
            println!(
                "Added alias {} {} for {} ({})",
                alias.first_name,
                alias.last_name,
                found.full_name(),
                alias.id
            );
        }

        AliasCommands::List { donor } => {
            let found = service.find(&donor)?;
            let aliases = service.list_aliases(found.id)?;
            if aliases.is_empty() {
                println!("{} has no aliases.", found.full_name());
            }
            for alias in aliases {
                println!("  {}  {} {}", alias.id, alias.first_name, alias.last_name);
            }
        }

        AliasCommands::Remove { alias } => {
            let id: AliasId = alias
                .parse()
                .map_err(|_| OffertoryError::Validation(format!("Invalid alias id: '{}'", alias)))?;
            service.remove_alias(id)?;
            println!("Removed alias {}", id);
        }

        AliasCommands::Find { first, last } => match service.find_by_alias(&first, &last)? {
            Some(donor) => println!("{} {} is an alias of {} ({})", first, last, donor.full_name(), donor.id),
            None => println!("No donor has the alias {} {}", first, last),
        },
    }

    Ok(())
}
