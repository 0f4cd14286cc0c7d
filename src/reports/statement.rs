//! Yearly Giving Statement
//!
//! One statement per donor and calendar year, listing every donation with
//! per-fund totals and a grand total.

use std::io::Write;

use chrono::NaiveDate;

use crate::config::settings::Settings;
use crate::error::{OffertoryError, OffertoryResult};
use crate::models::period::year_bounds;
use crate::models::{DonationLine, Donor, DonorId, Money};
use crate::storage::{DonationFilter, Storage};

use super::{subtotals_by_fund, write_report, FundSubtotal, REPORT_WIDTH};

/// One donation on a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLine {
    pub check_date: NaiveDate,
    pub check_number: String,
    pub fund_name: String,
    pub amount: Money,
}

/// Giving statement of a donor for a year
#[derive(Debug, Clone)]
pub struct DonorStatement {
    pub organization_name: String,
    pub currency_symbol: String,
    pub donor: Donor,
    pub year: i32,
    pub lines: Vec<StatementLine>,
    pub fund_totals: Vec<FundSubtotal>,
    pub total: Money,
}

fn year_filter(year: i32) -> OffertoryResult<(NaiveDate, NaiveDate)> {
    year_bounds(year).ok_or_else(|| OffertoryError::Validation(format!("Invalid year: {}", year)))
}

impl DonorStatement {
    /// Generate the statement of one donor
    pub fn generate(
        storage: &Storage,
        settings: &Settings,
        donor_id: DonorId,
        year: i32,
    ) -> OffertoryResult<Self> {
        let donor = storage
            .donors
            .get(donor_id)?
            .ok_or_else(|| OffertoryError::donor_not_found(donor_id.to_string()))?;
        let (from, to) = year_filter(year)?;
        let donations = storage.donations.lines(&DonationFilter {
            from: Some(from),
            to: Some(to),
            donor_id: Some(donor_id),
            batch_id: None,
        })?;
        Ok(Self::from_lines(settings, donor, year, &donations))
    }

    /// Statements for every donor who gave during `year`, sorted by donor
    /// name. Opted-out donors are left out.
    pub fn generate_all(storage: &Storage, settings: &Settings, year: i32) -> OffertoryResult<Vec<Self>> {
        let (from, to) = year_filter(year)?;
        let donations = storage
            .donations
            .lines(&DonationFilter::between(Some(from), Some(to)))?;

        let mut statements = Vec::new();
        for donor in storage.donors.list()? {
            if donor.opt_out {
                continue;
            }
            let own: Vec<DonationLine> = donations
                .iter()
                .filter(|d| d.donation.donor_id == donor.id)
                .cloned()
                .collect();
            if own.is_empty() {
                continue;
            }
            statements.push(Self::from_lines(settings, donor, year, &own));
        }
        Ok(statements)
    }

    fn from_lines(settings: &Settings, donor: Donor, year: i32, donations: &[DonationLine]) -> Self {
        let lines: Vec<StatementLine> = donations
            .iter()
            .map(|d| StatementLine {
                check_date: d.donation.check_date,
                check_number: d.donation.check_number.clone(),
                fund_name: d.fund_name.clone(),
                amount: d.donation.amount,
            })
            .collect();

        Self {
            organization_name: settings.organization_name.clone(),
            currency_symbol: settings.currency_symbol.clone(),
            donor,
            year,
            fund_totals: subtotals_by_fund(donations),
            total: lines.iter().map(|l| l.amount).sum(),
            lines,
        }
    }

    fn money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }

    /// Format the statement for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", self.organization_name));
        output.push_str(&format!("Giving Statement {}\n", self.year));
        output.push_str(&format!("Donor: {}\n", self.donor.full_name()));
        output.push_str(&"=".repeat(REPORT_WIDTH));
        output.push('\n');

        output.push_str(&format!(
            "{:<12} {:<10} {:<30} {:>17}\n",
            "Date", "Check #", "Fund", "Amount"
        ));
        output.push_str(&"-".repeat(REPORT_WIDTH));
        output.push('\n');

        if self.lines.is_empty() {
            output.push_str("No donations recorded.\n");
        }
        for line in &self.lines {
            output.push_str(&format!(
                "{:<12} {:<10} {:<30} {:>17}\n",
                line.check_date.format("%m/%d/%Y"),
                line.check_number,
                line.fund_name,
                self.money(line.amount)
            ));
        }

        output.push_str(&"-".repeat(REPORT_WIDTH));
        output.push('\n');
        for fund in &self.fund_totals {
            output.push_str(&format!(
                "  {:<52} {:>17}\n",
                fund.fund_name,
                self.money(fund.total)
            ));
        }

        output.push_str(&"=".repeat(REPORT_WIDTH));
        output.push('\n');
        output.push_str(&format!("{:<54} {:>17}\n", "TOTAL", self.money(self.total)));

        output
    }

    pub fn write_text<W: Write>(&self, writer: &mut W) -> OffertoryResult<()> {
        write_report(&self.format_terminal(), writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DonationDetails, DonorName, FundDetails, FundId};
    use crate::storage::initialize_storage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        storage: Storage,
        smith: Donor,
        doe: Donor,
        lee: Donor,
    }

    fn fixture() -> Fixture {
        let storage = Storage::open_in_memory().unwrap();
        initialize_storage(&storage).unwrap();
        let admin = storage.users.find_by_username("admin").unwrap().unwrap();
        let batch = storage
            .batches
            .create(date(2025, 1, 5), admin.id, Settings::default().batch_numbering)
            .unwrap();
        let missions = storage
            .funds
            .create(&FundDetails::with_unknown_bank("Missions"))
            .unwrap();

        let smith = storage.donors.create(&DonorName::new("John", "Smith")).unwrap();
        let doe = storage.donors.create(&DonorName::new("Jane", "Doe")).unwrap();
        let lee = storage.donors.create(&DonorName::new("Ann", "Lee")).unwrap();

        for (donor, fund, cents, day) in [
            (smith.id, FundId::DEFAULT, 5000, date(2025, 1, 5)),
            (smith.id, missions.id, 2000, date(2025, 6, 1)),
            (smith.id, FundId::DEFAULT, 7000, date(2024, 12, 29)),
            (doe.id, FundId::DEFAULT, 300, date(2025, 3, 3)),
            (lee.id, FundId::DEFAULT, 900, date(2024, 3, 3)),
        ] {
            storage
                .donations
                .create(&DonationDetails {
                    donor_id: donor,
                    batch_id: batch.id,
                    fund_id: fund,
                    check_number: String::new(),
                    amount: Money::from_cents(cents),
                    check_date: day,
                })
                .unwrap();
        }

        Fixture {
            storage,
            smith,
            doe,
            lee,
        }
    }

    #[test]
    fn test_statement_for_year() {
        let f = fixture();
        let statement =
            DonorStatement::generate(&f.storage, &Settings::default(), f.smith.id, 2025).unwrap();

        assert_eq!(statement.lines.len(), 2);
        assert_eq!(statement.total, Money::from_cents(7000));
        assert_eq!(statement.fund_totals.len(), 2);
        assert_eq!(statement.lines[0].check_date, date(2025, 1, 5));

        let text = statement.format_terminal();
        assert!(text.starts_with("Our Church\n"));
        assert!(text.contains("Giving Statement 2025"));
        assert!(text.contains("John Smith"));
        assert!(text.contains("$70.00"));
    }

    #[test]
    fn test_generate_all_skips_opt_out_and_idle_donors() {
        let f = fixture();
        let mut doe = f.doe.clone();
        doe.opt_out = true;
        f.storage.donors.update(&doe).unwrap();

        let statements =
            DonorStatement::generate_all(&f.storage, &Settings::default(), 2025).unwrap();
        let ids: Vec<DonorId> = statements.iter().map(|s| s.donor.id).collect();
        // Doe opted out, Lee gave only in 2024
        assert_eq!(ids, vec![f.smith.id]);
        assert!(!ids.contains(&f.lee.id));
    }

    #[test]
    fn test_empty_statement() {
        let f = fixture();
        let statement =
            DonorStatement::generate(&f.storage, &Settings::default(), f.lee.id, 2025).unwrap();
        assert!(statement.lines.is_empty());
        assert!(statement.total.is_zero());
        assert!(statement.format_terminal().contains("No donations recorded."));
    }
}
