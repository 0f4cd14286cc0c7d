//! CLI commands for data export
//!
//! Donations export as CSV in the layout the importer reads back; the
//! whole database exports as a SQL script.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Subcommand;

use crate::cli::parse_optional_date;
use crate::config::settings::Settings;
use crate::error::{OffertoryError, OffertoryResult};
use crate::export::{dump_sql, export_donations_csv};
use crate::services::BatchService;
use crate::storage::{DonationFilter, Storage};

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export donations to CSV
    Csv {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Check dates on or after
        #[arg(long)]
        from: Option<String>,
        /// Check dates on or before
        #[arg(long)]
        to: Option<String>,
        /// Only this batch (number or ID)
        #[arg(short, long)]
        batch: Option<String>,
    },
    /// Dump the whole database as a SQL script
    Sql {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn open_output(output: Option<&PathBuf>) -> OffertoryResult<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                OffertoryError::Export(format!("Failed to create {}: {}", path.display(), e))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Handle an export command
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExportCommands,
) -> OffertoryResult<()> {
    match cmd {
        ExportCommands::Csv {
            output,
            from,
            to,
            batch,
        } => {
            let batch_id = batch
                .map(|b| BatchService::new(storage, settings).find(&b))
                .transpose()?
                .map(|b| b.id);
            let filter = DonationFilter {
                from: parse_optional_date(from.as_deref())?,
                to: parse_optional_date(to.as_deref())?,
                batch_id,
                donor_id: None,
            };

            let mut writer = open_output(output.as_ref())?;
            let count = export_donations_csv(storage, &filter, &mut writer)?;
            writer.flush()?;

            if let Some(path) = output {
                println!("Exported {} donation(s) to {}", count, path.display());
            }
        }

        ExportCommands::Sql { output } => {
            let mut writer = open_output(output.as_ref())?;
            let stats = dump_sql(storage.database(), &mut writer)?;
            writer.flush()?;

            if let Some(path) = output {
                println!(
                    "Exported {} row(s) from {} table(s) to {}",
                    stats.total_rows(),
                    stats.tables.len(),
                    path.display()
                );
            }
        }
    }

    Ok(())
}
