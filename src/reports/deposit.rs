//! Deposit Report and Deposit Slip
//!
//! Both are generated for a single batch: the report lists every check with
//! per-fund subtotals, the slip is what goes to the bank.

use std::io::Write;

use crate::config::settings::Settings;
use crate::error::{OffertoryError, OffertoryResult};
use crate::models::{BankSettings, Batch, BatchId, Money};
use crate::storage::Storage;

use super::{subtotals_by_fund, write_report, FundSubtotal, REPORT_WIDTH};

/// One check on a deposit report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositLine {
    pub donor_name: String,
    pub check_number: String,
    pub fund_name: String,
    pub amount: Money,
}

/// Deposit report for a batch
#[derive(Debug, Clone)]
pub struct DepositReport {
    pub organization_name: String,
    pub currency_symbol: String,
    pub batch: Batch,
    pub lines: Vec<DepositLine>,
    pub fund_subtotals: Vec<FundSubtotal>,
    pub total: Money,
    pub item_count: usize,
}

fn load_batch(storage: &Storage, batch_id: BatchId) -> OffertoryResult<Batch> {
    storage
        .batches
        .get(batch_id)?
        .ok_or_else(|| OffertoryError::batch_not_found(batch_id.to_string()))
}

impl DepositReport {
    /// Generate the deposit report for a batch
    pub fn generate(storage: &Storage, settings: &Settings, batch_id: BatchId) -> OffertoryResult<Self> {
        let batch = load_batch(storage, batch_id)?;
        let donations = storage.donations.list_by_batch(batch_id)?;

        let lines = donations
            .iter()
            .map(|d| DepositLine {
                donor_name: format!("{}, {}", d.donor_last_name, d.donor_first_name),
                check_number: d.donation.check_number.clone(),
                fund_name: d.fund_name.clone(),
                amount: d.donation.amount,
            })
            .collect::<Vec<_>>();

        Ok(Self {
            organization_name: settings.organization_name.clone(),
            currency_symbol: settings.currency_symbol.clone(),
            batch,
            fund_subtotals: subtotals_by_fund(&donations),
            total: lines.iter().map(|l| l.amount).sum(),
            item_count: lines.len(),
            lines,
        })
    }

    fn money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", self.organization_name));
        output.push_str(&format!(
            "Deposit Report: Batch {} ({}) [{}]\n",
            self.batch.batch_number, self.batch.batch_date, self.batch.status
        ));
        output.push_str(&"=".repeat(REPORT_WIDTH));
        output.push('\n');

        output.push_str(&format!(
            "{:<28} {:<10} {:<18} {:>13}\n",
            "Donor", "Check #", "Fund", "Amount"
        ));
        output.push_str(&"-".repeat(REPORT_WIDTH));
        output.push('\n');

        for line in &self.lines {
            output.push_str(&format!(
                "{:<28} {:<10} {:<18} {:>13}\n",
                truncate(&line.donor_name, 28),
                truncate(&line.check_number, 10),
                truncate(&line.fund_name, 18),
                self.money(line.amount)
            ));
        }

        output.push_str(&"-".repeat(REPORT_WIDTH));
        output.push('\n');
        output.push_str("Fund Subtotals\n");
        for subtotal in &self.fund_subtotals {
            output.push_str(&format!(
                "  {:<45} {:>6} {:>17}\n",
                truncate(&subtotal.fund_name, 45),
                subtotal.count,
                self.money(subtotal.total)
            ));
        }

        output.push_str(&"=".repeat(REPORT_WIDTH));
        output.push('\n');
        output.push_str(&format!(
            "{:<47} {:>6} {:>17}\n",
            "TOTAL",
            self.item_count,
            self.money(self.total)
        ));

        output
    }

    /// Write the text rendering
    pub fn write_text<W: Write>(&self, writer: &mut W) -> OffertoryResult<()> {
        write_report(&self.format_terminal(), writer)
    }
}

/// Deposit slip for a batch
#[derive(Debug, Clone)]
pub struct DepositSlip {
    pub currency_symbol: String,
    pub batch: Batch,
    /// `None` until bank settings were saved
    pub bank: Option<BankSettings>,
    /// Check amounts in entry order
    pub checks: Vec<Money>,
    pub total: Money,
}

impl DepositSlip {
    /// Generate the deposit slip for a batch
    pub fn generate(storage: &Storage, settings: &Settings, batch_id: BatchId) -> OffertoryResult<Self> {
        let batch = load_batch(storage, batch_id)?;
        let checks: Vec<Money> = storage
            .donations
            .list_by_batch(batch_id)?
            .iter()
            .map(|d| d.donation.amount)
            .collect();

        Ok(Self {
            currency_symbol: settings.currency_symbol.clone(),
            batch,
            bank: storage.bank_settings.get()?,
            total: checks.iter().copied().sum(),
            checks,
        })
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Format the slip for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str("DEPOSIT SLIP\n");
        output.push_str(&"=".repeat(REPORT_WIDTH));
        output.push('\n');
        match &self.bank {
            Some(bank) => {
                output.push_str(&format!("Bank:           {}\n", bank.bank_name));
                output.push_str(&format!("Routing Number: {}\n", bank.routing_number));
                output.push_str(&format!("Account Name:   {}\n", bank.account_name));
                output.push_str(&format!(
                    "Account Number: {}\n",
                    bank.masked_account_number()
                ));
            }
            None => output.push_str("Bank settings not configured\n"),
        }
        output.push_str(&format!(
            "Batch:          {} ({})\n",
            self.batch.batch_number, self.batch.batch_date
        ));
        output.push_str(&"-".repeat(REPORT_WIDTH));
        output.push('\n');

        for (idx, amount) in self.checks.iter().enumerate() {
            output.push_str(&format!(
                "  Check {:>4} {:>20}\n",
                idx + 1,
                amount.format_with_symbol(&self.currency_symbol)
            ));
        }

        output.push_str(&"-".repeat(REPORT_WIDTH));
        output.push('\n');
        output.push_str(&format!("Checks: {}\n", self.check_count()));
        output.push_str(&format!(
            "Total:  {}\n",
            self.total.format_with_symbol(&self.currency_symbol)
        ));

        output
    }

    pub fn write_text<W: Write>(&self, writer: &mut W) -> OffertoryResult<()> {
        write_report(&self.format_terminal(), writer)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}~", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DonationDetails, DonorName, FundDetails, FundId};
    use crate::storage::initialize_storage;
    use chrono::NaiveDate;

    fn setup() -> (Storage, BatchId) {
        let storage = Storage::open_in_memory().unwrap();
        initialize_storage(&storage).unwrap();
        let admin = storage.users.find_by_username("admin").unwrap().unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 9, 7).unwrap();
        let batch = storage
            .batches
            .create(day, admin.id, Settings::default().batch_numbering)
            .unwrap();
        let building = storage
            .funds
            .create(&FundDetails::with_unknown_bank("Building"))
            .unwrap();
        let smith = storage
            .donors
            .create(&DonorName::new("John", "Smith"))
            .unwrap();
        let doe = storage
            .donors
            .create(&DonorName::new("Jane", "Doe"))
            .unwrap();

        for (donor, fund, cents, check) in [
            (smith.id, FundId::DEFAULT, 10000, "101"),
            (doe.id, building.id, 2500, "7"),
            (doe.id, FundId::DEFAULT, 1999, "8"),
        ] {
            storage
                .donations
                .create(&DonationDetails {
                    donor_id: donor,
                    batch_id: batch.id,
                    fund_id: fund,
                    check_number: check.into(),
                    amount: Money::from_cents(cents),
                    check_date: day,
                })
                .unwrap();
        }
        (storage, batch.id)
    }

    #[test]
    fn test_deposit_report_totals() {
        let (storage, batch_id) = setup();
        let report = DepositReport::generate(&storage, &Settings::default(), batch_id).unwrap();

        assert_eq!(report.item_count, 3);
        assert_eq!(report.total, Money::from_cents(14499));
        assert_eq!(
            report.fund_subtotals,
            vec![
                FundSubtotal {
                    fund_name: "Building".into(),
                    total: Money::from_cents(2500),
                    count: 1,
                },
                FundSubtotal {
                    fund_name: "General Fund".into(),
                    total: Money::from_cents(11999),
                    count: 2,
                },
            ]
        );
        let subtotal_sum: Money = report.fund_subtotals.iter().map(|s| s.total).sum();
        assert_eq!(subtotal_sum, report.total);

        let text = report.format_terminal();
        assert!(text.contains("Smith, John"));
        assert!(text.contains("$144.99"));
    }

    #[test]
    fn test_deposit_slip() {
        let (storage, batch_id) = setup();
        let slip = DepositSlip::generate(&storage, &Settings::default(), batch_id).unwrap();
        assert_eq!(slip.check_count(), 3);
        assert_eq!(slip.total, Money::from_cents(14499));
        assert!(slip.format_terminal().contains("Bank settings not configured"));

        storage
            .bank_settings
            .save(&BankSettings {
                bank_name: "First Bank".into(),
                routing_number: "011000015".into(),
                account_name: "Grace Church".into(),
                account_number: "123456789".into(),
            })
            .unwrap();
        let slip = DepositSlip::generate(&storage, &Settings::default(), batch_id).unwrap();
        let mut out = Vec::new();
        slip.write_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("First Bank"));
        assert!(text.contains("*****6789"));
        assert!(!text.contains("123456789"));
    }

    #[test]
    fn test_unknown_batch() {
        let storage = Storage::open_in_memory().unwrap();
        let err = DepositReport::generate(&storage, &Settings::default(), BatchId::new(9))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd~");
    }
}
