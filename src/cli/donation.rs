//! Donation CLI commands
//!
//! Checks are entered into an open batch. The donor is either an existing
//! one (`--donor`) or named with `--first`/`--last`, in which case a donor
//! with that exact name is reused or created.

use std::path::PathBuf;

use clap::Subcommand;

use crate::cli::{parse_date, parse_money, parse_optional_date};
use crate::config::paths::OffertoryPaths;
use crate::config::settings::Settings;
use crate::display::format_donation_list;
use crate::error::{OffertoryError, OffertoryResult};
use crate::models::{Donor, DonationId, DonorName};
use crate::services::{
    AddDonationInput, BatchService, CheckImageService, DonationService, DonorService, FundService,
    UpdateDonationInput,
};
use crate::storage::{DonationFilter, Storage};

/// Donation subcommands
#[derive(Subcommand)]
pub enum DonationCommands {
    /// Add a check to an open batch
    Add {
        /// Batch number or ID
        batch: String,
        /// Check amount (e.g. "125.00")
        #[arg(short, long)]
        amount: String,
        /// Existing donor ID or name
        #[arg(short, long, conflicts_with_all = ["first", "last"])]
        donor: Option<String>,
        /// Donor first name; the donor is created when unknown
        #[arg(long, requires = "last")]
        first: Option<String>,
        /// Donor last name
        #[arg(long, requires = "first")]
        last: Option<String>,
        /// Fund name or ID (defaults to the default fund)
        #[arg(short, long)]
        fund: Option<String>,
        /// Check number
        #[arg(short, long, default_value = "")]
        check: String,
        /// Check date (defaults to the batch date)
        #[arg(long)]
        date: Option<String>,
    },
    /// List donations
    List {
        /// Only this batch
        #[arg(short, long)]
        batch: Option<String>,
        /// Only this donor
        #[arg(short, long)]
        donor: Option<String>,
        /// Check dates on or after
        #[arg(long)]
        from: Option<String>,
        /// Check dates on or before
        #[arg(long)]
        to: Option<String>,
    },
    /// Edit a donation in an open batch
    Edit {
        /// Donation ID
        donation: String,
        #[arg(short, long)]
        amount: Option<String>,
        /// Donor ID or name
        #[arg(short, long)]
        donor: Option<String>,
        /// Fund name or ID
        #[arg(short, long)]
        fund: Option<String>,
        #[arg(short, long)]
        check: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a donation from an open batch
    Delete {
        /// Donation ID
        donation: String,
    },
    /// Attach a scanned check image to a donation
    AttachImage {
        /// Donation ID
        donation: String,
        /// Image file to copy
        file: PathBuf,
    },
    /// List the check images of a batch
    Images {
        /// Batch number or ID
        batch: String,
    },
}

fn parse_donation_id(s: &str) -> OffertoryResult<DonationId> {
    s.parse()
        .map_err(|_| OffertoryError::Validation(format!("Invalid donation id: '{}'", s)))
}

/// Handle a donation command
pub fn handle_donation_command(
    storage: &Storage,
    settings: &Settings,
    paths: &OffertoryPaths,
    cmd: DonationCommands,
) -> OffertoryResult<()> {
    let service = DonationService::new(storage, settings);
    let batches = BatchService::new(storage, settings);
    let donors = DonorService::new(storage);
    let funds = FundService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        DonationCommands::Add {
            batch,
            amount,
            donor,
            first,
            last,
            fund,
            check,
            date,
        } => {
            let batch = batches.find(&batch)?;
            let amount = parse_money(&amount)?;
            let donor = resolve_donor(&donors, donor, first, last)?;
            let fund_id = fund.map(|f| funds.find(&f)).transpose()?.map(|f| f.id);
            let check_date = match date {
                Some(d) => parse_date(&d)?,
                None => batch.batch_date,
            };

            let donation = service.add(AddDonationInput {
                batch_id: batch.id,
                donor_id: donor.id,
                fund_id,
                check_number: check,
                amount,
                check_date,
            })?;
            let (total, count) = batches.totals(batch.id)?;
            println!(
                "Added {} from {} to batch {} ({})",
                donation.amount.format_with_symbol(symbol),
                donor.full_name(),
                batch.batch_number,
                donation.id
            );
            println!(
                "  Batch total: {} ({} checks)",
                total.format_with_symbol(symbol),
                count
            );
        }

        DonationCommands::List {
            batch,
            donor,
            from,
            to,
        } => {
            let filter = DonationFilter {
                from: parse_optional_date(from.as_deref())?,
                to: parse_optional_date(to.as_deref())?,
                batch_id: batch.map(|b| batches.find(&b)).transpose()?.map(|b| b.id),
                donor_id: donor.map(|d| donors.find(&d)).transpose()?.map(|d| d.id),
            };
            let lines = service.list(&filter)?;
            print!("{}", format_donation_list(&lines, symbol));
        }

        DonationCommands::Edit {
            donation,
            amount,
            donor,
            fund,
            check,
            date,
        } => {
            let id = parse_donation_id(&donation)?;
            let input = UpdateDonationInput {
                donor_id: donor.map(|d| donors.find(&d)).transpose()?.map(|d| d.id),
                fund_id: fund.map(|f| funds.find(&f)).transpose()?.map(|f| f.id),
                check_number: check,
                amount: amount.as_deref().map(parse_money).transpose()?,
                check_date: parse_optional_date(date.as_deref())?,
            };
            let updated = service.update(id, input)?;
            println!(
                "Updated donation {}: {} on {}",
                updated.id,
                updated.amount.format_with_symbol(symbol),
                updated.check_date
            );
        }

        DonationCommands::Delete { donation } => {
            let id = parse_donation_id(&donation)?;
            let deleted = service.delete(id)?;
            if deleted.check_image_id.is_some() {
                // The image row cascades with the donation; the file does not
                CheckImageService::new(storage, paths).prune_orphans()?;
            }
            println!(
                "Deleted donation {} ({})",
                deleted.id,
                deleted.amount.format_with_symbol(symbol)
            );
        }

        DonationCommands::AttachImage { donation, file } => {
            let id = parse_donation_id(&donation)?;
            let images = CheckImageService::new(storage, paths);
            let image = images.attach_file(id, &file)?;
            println!("Attached {} to donation {}", image.id, id);
            println!("  Stored at: {}", images.resolve(&image).display());
        }

        DonationCommands::Images { batch } => {
            let batch = batches.find(&batch)?;
            let images = CheckImageService::new(storage, paths);
            let list = images.list_by_batch(batch.id)?;
            if list.is_empty() {
                println!("No check images for batch {}.", batch.batch_number);
            }
            for image in list {
                println!(
                    "  {}  {}  {}",
                    image.id,
                    image.donation_id,
                    images.resolve(&image).display()
                );
            }
        }
    }

    Ok(())
}

fn resolve_donor(
    donors: &DonorService<'_>,
    donor: Option<String>,
    first: Option<String>,
    last: Option<String>,
) -> OffertoryResult<Donor> {
    match (donor, first, last) {
        (Some(identifier), _, _) => donors.find(&identifier),
        (None, Some(first), Some(last)) => {
            let (donor, created) = donors.resolve_or_create(&DonorName::new(&first, &last))?;
            if created {
                println!("New donor: {}", donor.full_name());
            }
            Ok(donor)
        }
        _ => Err(OffertoryError::Validation(
            "Give either --donor or both --first and --last".into(),
        )),
    }
}
