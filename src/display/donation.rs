//! Donation display formatting

use crate::models::{DonationLine, Money};

/// Format donations as a table with a total row
pub fn format_donation_list(lines: &[DonationLine], symbol: &str) -> String {
    if lines.is_empty() {
        return "No donations found.\n".to_string();
    }

    let name_width = lines
        .iter()
        .map(|l| l.donor_name().len())
        .max()
        .unwrap_or(5)
        .max(5);
    let fund_width = lines
        .iter()
        .map(|l| l.fund_name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<8}  {:<10}  {:<name_width$}  {:<8}  {:<fund_width$}  {:>12}\n",
        "ID",
        "Date",
        "Donor",
        "Check #",
        "Fund",
        "Amount",
        name_width = name_width,
        fund_width = fund_width,
    ));
    output.push_str(&format!(
        "{:-<8}  {:-<10}  {:-<name_width$}  {:-<8}  {:-<fund_width$}  {:->12}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
        fund_width = fund_width,
    ));

    for line in lines {
        let image = if line.donation.check_image_id.is_some() {
            " *"
        } else {
            ""
        };
        output.push_str(&format!(
            "{:<8}  {:<10}  {:<name_width$}  {:<8}  {:<fund_width$}  {:>12}{}\n",
            line.donation.id.to_string(),
            line.donation.check_date.to_string(),
            line.donor_name(),
            line.donation.check_number,
            line.fund_name,
            line.donation.amount.format_with_symbol(symbol),
            image,
            name_width = name_width,
            fund_width = fund_width,
        ));
    }

    let total: Money = lines.iter().map(|l| l.donation.amount).sum();
    output.push_str(&format!(
        "{:<width$}  {:>12}\n",
        format!("TOTAL ({} checks)", lines.len()),
        total.format_with_symbol(symbol),
        width = 8 + 2 + 10 + 2 + name_width + 2 + 8 + 2 + fund_width,
    ));

    output
}
