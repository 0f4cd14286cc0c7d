//! Batch display formatting
//!
//! Formats batches and their donations for terminal output.

use crate::models::{BatchSummary, DonationLine, Money};

/// Format batches with their running totals as a table
pub fn format_batch_list(summaries: &[BatchSummary], symbol: &str) -> String {
    if summaries.is_empty() {
        return "No batches found.\n".to_string();
    }

    let number_width = summaries
        .iter()
        .map(|s| s.batch.batch_number.len())
        .max()
        .unwrap_or(6)
        .max(6);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<8}  {:<number_width$}  {:<10}  {:<6}  {:>6}  {:>14}\n",
        "ID",
        "Number",
        "Date",
        "Status",
        "Checks",
        "Total",
        number_width = number_width,
    ));
    output.push_str(&format!(
        "{:-<8}  {:-<number_width$}  {:-<10}  {:-<6}  {:->6}  {:->14}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        number_width = number_width,
    ));

    for summary in summaries {
        output.push_str(&format!(
            "{:<8}  {:<number_width$}  {:<10}  {:<6}  {:>6}  {:>14}\n",
            summary.batch.id.to_string(),
            summary.batch.batch_number,
            summary.batch.batch_date.to_string(),
            summary.batch.status.to_string(),
            summary.donation_count,
            summary.total.format_with_symbol(symbol),
            number_width = number_width,
        ));
    }

    output
}

/// Format a batch header followed by its donations
pub fn format_batch_details(summary: &BatchSummary, lines: &[DonationLine], symbol: &str) -> String {
    let batch = &summary.batch;
    let mut output = String::new();

    output.push_str(&format!("Batch: {}\n", batch.batch_number));
    output.push_str(&format!("  ID:       {}\n", batch.id));
    output.push_str(&format!("  Date:     {}\n", batch.batch_date));
    output.push_str(&format!("  Status:   {}\n", batch.status));
    output.push_str(&format!("  Checks:   {}\n", summary.donation_count));
    output.push_str(&format!(
        "  Total:    {}\n",
        summary.total.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Created:  {}\n",
        batch.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push('\n');
    output.push_str(&super::donation::format_donation_list(lines, symbol));

    output
}

/// One-line batch total, e.g. after adding a donation
pub fn format_batch_total(batch_number: &str, total: Money, count: i64, symbol: &str) -> String {
    format!(
        "Batch {} now holds {} check(s) totalling {}",
        batch_number,
        count,
        total.format_with_symbol(symbol)
    )
}
