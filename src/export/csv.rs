//! CSV Export functionality
//!
//! Exports donations in the layout the importer recognises, so an export
//! can be fed back through `offertory import` unchanged.

use std::io::Write;

use crate::error::{OffertoryError, OffertoryResult};
use crate::models::DonationLine;
use crate::storage::{DonationFilter, Storage};

/// Column names of an export, in order
pub const EXPORT_HEADER: [&str; 6] = [
    "First Name",
    "Last Name",
    "Check Date",
    "Check Amount",
    "Check Number",
    "Fund Name",
];

/// Date format of the `Check Date` column
pub const EXPORT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Export the donations matching `filter`, ordered by check date.
///
/// Returns the number of donation rows written.
pub fn export_donations_csv<W: Write>(
    storage: &Storage,
    filter: &DonationFilter,
    writer: &mut W,
) -> OffertoryResult<usize> {
    let lines = storage.donations.lines(filter)?;
    write_donations_csv(&lines, writer)?;
    Ok(lines.len())
}

/// Write already loaded donation lines
pub fn write_donations_csv<W: Write>(lines: &[DonationLine], writer: &mut W) -> OffertoryResult<()> {
    writeln!(writer, "{}", EXPORT_HEADER.join(","))
        .map_err(|e| OffertoryError::Export(e.to_string()))?;

    for line in lines {
        let donation = &line.donation;
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            escape_csv(&line.donor_first_name),
            escape_csv(&line.donor_last_name),
            donation.check_date.format(EXPORT_DATE_FORMAT),
            donation.amount.to_decimal_string(),
            escape_csv(&donation.check_number),
            escape_csv(&line.fund_name),
        )
        .map_err(|e| OffertoryError::Export(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| OffertoryError::Export(e.to_string()))?;
    Ok(())
}

/// Escape a string for CSV output
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
