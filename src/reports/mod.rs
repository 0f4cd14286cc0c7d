//! Reports module for Offertory
//!
//! Provides the deposit report and deposit slip for a batch and yearly giving
//! statements for donors. Each report is plain data with a fixed-layout text
//! rendering.

pub mod deposit;
pub mod statement;

pub use deposit::{DepositLine, DepositReport, DepositSlip};
pub use statement::{DonorStatement, StatementLine};

use std::collections::BTreeMap;
use std::io::Write;

use crate::error::{OffertoryError, OffertoryResult};
use crate::models::{DonationLine, Money};

/// Width of the text renderings
pub(crate) const REPORT_WIDTH: usize = 72;

/// Amount and item count booked to one fund
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundSubtotal {
    pub fund_name: String,
    pub total: Money,
    pub count: usize,
}

/// Per-fund subtotals, ordered by fund name
pub fn subtotals_by_fund(lines: &[DonationLine]) -> Vec<FundSubtotal> {
    let mut by_fund: BTreeMap<&str, (Money, usize)> = BTreeMap::new();
    for line in lines {
        let entry = by_fund
            .entry(line.fund_name.as_str())
            .or_insert((Money::zero(), 0));
        entry.0 += line.donation.amount;
        entry.1 += 1;
    }

    by_fund
        .into_iter()
        .map(|(name, (total, count))| FundSubtotal {
            fund_name: name.to_string(),
            total,
            count,
        })
        .collect()
}

/// Write a rendered report
pub(crate) fn write_report<W: Write>(text: &str, writer: &mut W) -> OffertoryResult<()> {
    writer
        .write_all(text.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| OffertoryError::Io(format!("Failed to write report: {}", e)))
}
