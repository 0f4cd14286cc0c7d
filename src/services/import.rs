//! CSV Import service
//!
//! Reads donation rows from a delimited file, skips the rows that cannot be
//! imported and books the rest into one new batch per check date. Donors and
//! funds are matched by exact name and created on first encounter.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::{Local, NaiveDate};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::settings::Settings;
use crate::error::{OffertoryError, OffertoryResult};
use crate::export::csv::EXPORT_HEADER;
use crate::models::{Batch, DonationDetails, DonorName, FundDetails, Money, User};
use crate::services::{DonorService, FundService};
use crate::storage::Storage;

/// Header of the standard import layout
pub const STANDARD_HEADER: [&str; 6] = [
    "LastName",
    "FirstName",
    "Date",
    "Amount",
    "FundName",
    "CheckNumber",
];

/// Date formats tried in order
const DATE_FORMATS: [&str; 4] = ["%m/%d/%Y", "%-m/%-d/%Y", "%Y-%m-%d", "%m-%d-%Y"];

/// Rows need at least this many columns
const MIN_COLUMNS: usize = 6;

/// Column positions of the fields in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportLayout {
    pub last_name: usize,
    pub first_name: usize,
    pub date: usize,
    pub amount: usize,
    pub fund_name: usize,
    pub check_number: usize,
}

impl ImportLayout {
    /// `LastName,FirstName,Date,Amount,FundName,CheckNumber`
    pub fn standard() -> Self {
        Self {
            last_name: 0,
            first_name: 1,
            date: 2,
            amount: 3,
            fund_name: 4,
            check_number: 5,
        }
    }

    /// The layout written by the CSV export
    pub fn export() -> Self {
        Self {
            first_name: 0,
            last_name: 1,
            date: 2,
            amount: 3,
            check_number: 4,
            fund_name: 5,
        }
    }

    /// Pick the layout from the header row: the export layout when the
    /// header is the export header, the standard layout otherwise
    pub fn detect(header: &StringRecord) -> Self {
        let is_export = header.len() == EXPORT_HEADER.len()
            && header
                .iter()
                .zip(EXPORT_HEADER.iter())
                .all(|(field, expected)| field.trim().eq_ignore_ascii_case(expected));

        if is_export {
            Self::export()
        } else {
            Self::standard()
        }
    }
}

/// A row that passed parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based line number in the file
    pub line: u64,
    pub name: DonorName,
    pub check_date: NaiveDate,
    /// The date could not be parsed and today was used instead
    pub date_fell_back: bool,
    pub amount: Money,
    pub fund_name: String,
    pub check_number: String,
}

/// A row left out of the import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based line number in the file
    pub line: u64,
    pub reason: String,
}

/// Outcome of parsing a file without writing anything
#[derive(Debug, Clone)]
pub struct ImportPreview {
    pub layout: ImportLayout,
    pub rows: Vec<ParsedRow>,
    pub skipped: Vec<SkippedRow>,
}

impl ImportPreview {
    /// Distinct check dates, ascending; one batch is created per date
    pub fn batch_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.rows.iter().map(|r| r.check_date).collect();
        dates.sort();
        dates.dedup();
        dates
    }

    pub fn total(&self) -> Money {
        self.rows.iter().map(|r| r.amount).sum()
    }
}

/// Result of a completed import
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    /// Created batches in ascending date order
    pub batches: Vec<Batch>,
    pub donations_created: usize,
    pub donors_created: usize,
    pub funds_created: usize,
    /// Rows whose date fell back to today
    pub date_fallbacks: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Parse a date trying each supported format
pub fn parse_import_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

fn parse_record(
    record: &StringRecord,
    line: u64,
    layout: &ImportLayout,
    today: NaiveDate,
) -> Result<ParsedRow, String> {
    if record.len() < MIN_COLUMNS {
        return Err(format!(
            "expected {} columns, found {}",
            MIN_COLUMNS,
            record.len()
        ));
    }

    let field = |idx: usize| record.get(idx).unwrap_or("").trim();

    let name = DonorName::new(field(layout.first_name), field(layout.last_name));
    name.validate()?;

    let amount_str = field(layout.amount);
    let amount =
        Money::parse(amount_str).map_err(|_| format!("invalid amount '{}'", amount_str))?;
    if amount.is_negative() {
        return Err(format!("negative amount '{}'", amount_str));
    }

    let date_str = field(layout.date);
    let (check_date, date_fell_back) = match parse_import_date(date_str) {
        Some(date) => (date, false),
        None => {
            warn!(line, date = date_str, "unparseable date, using today");
            (today, true)
        }
    };

    let fund_name = field(layout.fund_name).to_string();
    if !fund_name.is_empty() {
        FundDetails::with_unknown_bank(fund_name.as_str()).validate()?;
    }

    let check_number = field(layout.check_number).to_string();
    if check_number.len() > 32 {
        return Err(format!("check number too long '{}'", check_number));
    }

    Ok(ParsedRow {
        line,
        name,
        check_date,
        date_fell_back,
        amount,
        fund_name,
        check_number,
    })
}

/// Service for CSV import
pub struct ImportService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// Parse a CSV from a reader. The first row is always the header.
    pub fn parse<R: Read>(&self, reader: R, today: NaiveDate) -> OffertoryResult<ImportPreview> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut records = csv_reader.records();
        let header = match records.next() {
            Some(header) => header?,
            None => return Err(OffertoryError::Import("The file is empty".into())),
        };
        let layout = ImportLayout::detect(&header);

        let mut rows = Vec::new();
        let mut skipped = Vec::new();
        for (idx, result) in records.enumerate() {
            // Header is line 1
            let fallback_line = idx as u64 + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    let line = e
                        .position()
                        .map(|p| p.line())
                        .unwrap_or(fallback_line);
                    warn!(line, error = %e, "skipping unreadable row");
                    skipped.push(SkippedRow {
                        line,
                        reason: format!("unreadable row: {}", e),
                    });
                    continue;
                }
            };

            // Blank lines are not rows
            if record.iter().all(|f| f.is_empty()) {
                continue;
            }

            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(fallback_line);
            match parse_record(&record, line, &layout, today) {
                Ok(row) => rows.push(row),
                Err(reason) => {
                    warn!(line, %reason, "skipping row");
                    skipped.push(SkippedRow { line, reason });
                }
            }
        }

        Ok(ImportPreview {
            layout,
            rows,
            skipped,
        })
    }

    /// Parse a file without writing anything
    pub fn preview_file(&self, path: &Path) -> OffertoryResult<ImportPreview> {
        let file = std::fs::File::open(path).map_err(|e| {
            OffertoryError::Import(format!("Failed to open {}: {}", path.display(), e))
        })?;
        self.parse(file, Local::now().date_naive())
    }

    /// Import a file on behalf of `acting`
    pub fn import_file(&self, path: &Path, acting: &User) -> OffertoryResult<ImportResult> {
        let preview = self.preview_file(path)?;
        self.import(preview, acting)
    }

    /// Import from any reader; unparseable dates fall back to `today`
    pub fn import_reader<R: Read>(
        &self,
        reader: R,
        acting: &User,
        today: NaiveDate,
    ) -> OffertoryResult<ImportResult> {
        let preview = self.parse(reader, today)?;
        self.import(preview, acting)
    }

    /// Write a parsed file: one batch per check date, then its donations.
    ///
    /// Writes are sequential; a failure midway leaves what was already
    /// written in place.
    pub fn import(&self, preview: ImportPreview, acting: &User) -> OffertoryResult<ImportResult> {
        if preview.rows.is_empty() {
            return Err(OffertoryError::Import(format!(
                "No importable rows ({} skipped)",
                preview.skipped.len()
            )));
        }

        let donors = DonorService::new(self.storage);
        let funds = FundService::new(self.storage);

        let mut by_date: BTreeMap<NaiveDate, Vec<ParsedRow>> = BTreeMap::new();
        for row in preview.rows {
            by_date.entry(row.check_date).or_default().push(row);
        }

        let mut result = ImportResult {
            skipped: preview.skipped,
            ..ImportResult::default()
        };

        for (date, rows) in by_date {
            let batch = self
                .storage
                .batches
                .create(date, acting.id, self.settings.batch_numbering)?;
            info!(batch = %batch.id, number = %batch.batch_number, rows = rows.len(), "import batch created");

            for row in rows {
                let (donor, donor_created) = donors.resolve_or_create(&row.name)?;
                if donor_created {
                    result.donors_created += 1;
                }

                let fund_id = if row.fund_name.is_empty() {
                    self.settings.default_fund_id
                } else {
                    let (fund, fund_created) = funds.resolve_or_create(&row.fund_name)?;
                    if fund_created {
                        result.funds_created += 1;
                    }
                    fund.id
                };

                self.storage.donations.create(&DonationDetails {
                    donor_id: donor.id,
                    batch_id: batch.id,
                    fund_id,
                    check_number: row.check_number,
                    amount: row.amount,
                    check_date: row.check_date,
                })?;
                result.donations_created += 1;
                if row.date_fell_back {
                    result.date_fallbacks += 1;
                }
            }

            result.batches.push(batch);
        }

        info!(
            batches = result.batches.len(),
            donations = result.donations_created,
            skipped = result.skipped.len(),
            "import finished"
        );
        Ok(result)
    }
}
