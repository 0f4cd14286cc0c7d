//! Batch CLI commands
//!
//! Batches are addressed by batch number (e.g. `20250105-01`) or `bat-` id.

use chrono::Local;
use clap::Subcommand;

use crate::cli::parse_optional_date;
use crate::config::paths::OffertoryPaths;
use crate::config::settings::Settings;
use crate::display::{format_batch_details, format_batch_list, format_batch_total};
use crate::error::OffertoryResult;
use crate::services::{BatchService, CheckImageService, DonationService};
use crate::session::SessionHolder;
use crate::storage::Storage;

/// Batch subcommands
#[derive(Subcommand)]
pub enum BatchCommands {
    /// Open a new batch
    Create {
        /// Batch date (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List batches with totals, newest first
    List,
    /// Show a batch and its donations
    Show {
        /// Batch number or ID
        batch: String,
    },
    /// Show a batch's running total
    Total {
        /// Batch number or ID
        batch: String,
    },
    /// Close a batch; closed batches cannot be edited
    Close {
        /// Batch number or ID
        batch: String,
    },
    /// Delete a batch with all its donations
    Delete {
        /// Batch number or ID
        batch: String,
    },
}

/// Handle a batch command
pub fn handle_batch_command(
    storage: &Storage,
    settings: &Settings,
    paths: &OffertoryPaths,
    session: &SessionHolder,
    cmd: BatchCommands,
) -> OffertoryResult<()> {
    let service = BatchService::new(storage, settings);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        BatchCommands::Create { date } => {
            let acting = session.require_user()?;
            let date = parse_optional_date(date.as_deref())?
                .unwrap_or_else(|| Local::now().date_naive());
            let batch = service.create(&acting, date)?;
            println!("Created batch: {}", batch.batch_number);
            println!("  Date: {}", batch.batch_date);
            println!("  ID:   {}", batch.id);
        }

        BatchCommands::List => {
            let summaries = service.list_summaries()?;
            print!("{}", format_batch_list(&summaries, symbol));
        }

        BatchCommands::Show { batch } => {
            let found = service.find(&batch)?;
            let summary = service.summary(found.id)?;
            let lines = DonationService::new(storage, settings).list_by_batch(found.id)?;
            print!("{}", format_batch_details(&summary, &lines, symbol));
        }

        BatchCommands::Total { batch } => {
            let found = service.find(&batch)?;
            let (total, count) = service.totals(found.id)?;
            println!(
                "{}",
                format_batch_total(&found.batch_number, total, count, symbol)
            );
        }

        BatchCommands::Close { batch } => {
            let found = service.find(&batch)?;
            let closed = service.close(found.id)?;
            println!("Closed batch {}", closed.batch_number);
        }

        BatchCommands::Delete { batch } => {
            let acting = session.require_user()?;
            let found = service.find(&batch)?;
            let (total, count) = service.totals(found.id)?;
            let deleted = service.delete(&acting, found.id)?;
            let removed = CheckImageService::new(storage, paths).prune_orphans()?;
            println!(
                "Deleted batch {} ({} donation(s), {})",
                deleted.batch_number,
                count,
                total.format_with_symbol(symbol)
            );
            if removed > 0 {
                println!("Removed {} check image file(s)", removed);
            }
        }
    }

    Ok(())
}
