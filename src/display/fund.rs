//! Fund display formatting

use crate::models::{Fund, FundId};

/// Format funds as a table; the default fund is marked
pub fn format_fund_list(funds: &[Fund], default_fund: FundId) -> String {
    if funds.is_empty() {
        return "No funds found.\n".to_string();
    }

    let name_width = funds.iter().map(|f| f.name.len()).max().unwrap_or(4).max(4);
    let bank_width = funds
        .iter()
        .map(|f| f.bank_name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<8}  {:<name_width$}  {:<bank_width$}  {}\n",
        "ID",
        "Name",
        "Bank",
        "Account",
        name_width = name_width,
        bank_width = bank_width,
    ));
    output.push_str(&format!(
        "{:-<8}  {:-<name_width$}  {:-<bank_width$}  {:-<12}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
        bank_width = bank_width,
    ));

    for fund in funds {
        let marker = if fund.id == default_fund { " (default)" } else { "" };
        output.push_str(&format!(
            "{:<8}  {:<name_width$}  {:<bank_width$}  {}{}\n",
            fund.id.to_string(),
            fund.name,
            fund.bank_name,
            fund.account_name,
            marker,
            name_width = name_width,
            bank_width = bank_width,
        ));
    }
    output
}

/// Format a single fund's details
pub fn format_fund_details(fund: &Fund, donation_count: i64) -> String {
    let mut output = String::new();
    output.push_str(&format!("Fund: {}\n", fund.name));
    output.push_str(&format!("  ID:              {}\n", fund.id));
    output.push_str(&format!("  Bank:            {}\n", fund.bank_name));
    output.push_str(&format!("  Account Name:    {}\n", fund.account_name));
    output.push_str(&format!("  Account Number:  {}\n", fund.account_number));
    output.push_str(&format!("  Donations:       {}\n", donation_count));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fund_list_marks_default() {
        let funds = vec![
            Fund {
                id: FundId::DEFAULT,
                name: "General Fund".into(),
                bank_name: "First Bank".into(),
                account_name: "Operating".into(),
                account_number: "1234".into(),
            },
            Fund {
                id: FundId::new(2),
                name: "Missions".into(),
                bank_name: "Unknown".into(),
                account_name: "Unknown".into(),
                account_number: "Unknown".into(),
            },
        ];
        let output = format_fund_list(&funds, FundId::DEFAULT);
        assert!(output.contains("Operating (default)"));
        assert!(!output.contains("Unknown (default)"));
    }
}
