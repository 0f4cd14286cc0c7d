//! Dashboard display formatting

use crate::models::{FundTotal, ReportingPeriod};
use crate::services::DashboardTotals;

/// Month/quarter/year to date totals followed by the per-fund breakdown
pub fn format_dashboard(totals: &DashboardTotals, funds: &[FundTotal], symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Giving as of {}\n", totals.as_of));
    output.push_str(&format!("{:-<40}\n", ""));
    for period in ReportingPeriod::all() {
        output.push_str(&format!(
            "  {:<20} {:>16}\n",
            period.label(),
            totals.get(period).format_with_symbol(symbol)
        ));
    }

    if !funds.is_empty() {
        output.push('\n');
        output.push_str("Year to date by fund\n");
        output.push_str(&format!("{:-<40}\n", ""));
        for fund in funds {
            output.push_str(&format!(
                "  {:<20} {:>16}  ({} checks)\n",
                fund.fund_name,
                fund.total.format_with_symbol(symbol),
                fund.count
            ));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FundId, Money};
    use chrono::NaiveDate;

    #[test]
    fn test_format_dashboard() {
        let totals = DashboardTotals {
            as_of: NaiveDate::from_ymd_opt(2025, 5, 21).unwrap(),
            month_to_date: Money::from_cents(345),
            quarter_to_date: Money::from_cents(2345),
            year_to_date: Money::from_cents(3345),
        };
        let funds = vec![FundTotal {
            fund_id: FundId::DEFAULT,
            fund_name: "General Fund".into(),
            total: Money::from_cents(3345),
            count: 4,
        }];
        let output = format_dashboard(&totals, &funds, "$");
        assert!(output.contains("Month to date"));
        assert!(output.contains("$3.45"));
        assert!(output.contains("$33.45"));
        assert!(output.contains("General Fund"));
    }
}
