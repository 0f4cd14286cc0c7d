//! CLI commands for reports
//!
//! Deposit reports and slips per batch, and yearly giving statements.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local};
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::{OffertoryError, OffertoryResult};
use crate::reports::{DepositReport, DepositSlip, DonorStatement};
use crate::services::{BatchService, DonorService};
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Deposit report of a batch, itemized with fund subtotals
    Deposit {
        /// Batch number or ID
        batch: String,

        /// Write to a text file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Deposit slip of a batch
    Slip {
        /// Batch number or ID
        batch: String,

        /// Write to a text file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Giving statement of one donor
    Statement {
        /// Donor ID or name
        donor: String,

        /// Calendar year (defaults to last year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Write to a text file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Giving statements of every donor who gave during a year
    Statements {
        /// Calendar year (defaults to last year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Directory receiving one file per donor
        #[arg(short, long)]
        output_dir: PathBuf,
    },
}

/// Handle report commands
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> OffertoryResult<()> {
    match cmd {
        ReportCommands::Deposit { batch, output } => {
            let batch = BatchService::new(storage, settings).find(&batch)?;
            let report = DepositReport::generate(storage, settings, batch.id)?;
            match output {
                Some(path) => {
                    report.write_text(&mut create_file(&path)?)?;
                    println!("Deposit report written to: {}", path.display());
                }
                None => println!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Slip { batch, output } => {
            let batch = BatchService::new(storage, settings).find(&batch)?;
            let slip = DepositSlip::generate(storage, settings, batch.id)?;
            match output {
                Some(path) => {
                    slip.write_text(&mut create_file(&path)?)?;
                    println!("Deposit slip written to: {}", path.display());
                }
                None => println!("{}", slip.format_terminal()),
            }
        }

        ReportCommands::Statement {
            donor,
            year,
            output,
        } => {
            let donor = DonorService::new(storage).find(&donor)?;
            let statement =
                DonorStatement::generate(storage, settings, donor.id, year.unwrap_or_else(last_year))?;
            match output {
                Some(path) => {
                    statement.write_text(&mut create_file(&path)?)?;
                    println!("Statement written to: {}", path.display());
                }
                None => println!("{}", statement.format_terminal()),
            }
        }

        ReportCommands::Statements { year, output_dir } => {
            let year = year.unwrap_or_else(last_year);
            let statements = DonorStatement::generate_all(storage, settings, year)?;
            if statements.is_empty() {
                println!("No donations recorded in {}.", year);
                return Ok(());
            }

            fs::create_dir_all(&output_dir).map_err(|e| {
                OffertoryError::Export(format!(
                    "Failed to create {}: {}",
                    output_dir.display(),
                    e
                ))
            })?;
            for statement in &statements {
                let path = output_dir.join(statement_filename(statement));
                statement.write_text(&mut create_file(&path)?)?;
            }
            println!(
                "Wrote {} statement(s) for {} to: {}",
                statements.len(),
                year,
                output_dir.display()
            );
        }
    }

    Ok(())
}

fn last_year() -> i32 {
    Local::now().year() - 1
}

fn create_file(path: &Path) -> OffertoryResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        OffertoryError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

/// `statement-2024-smith-john-dnr-7.txt`
fn statement_filename(statement: &DonorStatement) -> String {
    let slug = |s: &str| -> String {
        s.chars()
            .filter_map(|c| {
                if c.is_ascii_alphanumeric() {
                    Some(c.to_ascii_lowercase())
                } else if c == ' ' || c == '-' {
                    Some('-')
                } else {
                    None
                }
            })
            .collect()
    };
    format!(
        "statement-{}-{}-{}-{}.txt",
        statement.year,
        slug(&statement.donor.last_name),
        slug(&statement.donor.first_name),
        statement.donor.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Donor, DonorId, Money};
    use chrono::Utc;

    #[test]
    fn test_statement_filename() {
        let statement = DonorStatement {
            organization_name: "Grace Church".into(),
            currency_symbol: "$".into(),
            donor: Donor {
                id: DonorId::new(7),
                first_name: "Mary Ann".into(),
                last_name: "O'Brien".into(),
                opt_out: false,
                created_at: Utc::now(),
            },
            year: 2024,
            lines: Vec::new(),
            fund_totals: Vec::new(),
            total: Money::zero(),
        };
        assert_eq!(
            statement_filename(&statement),
            "statement-2024-obrien-mary-ann-dnr-7.txt"
        );
    }
}
