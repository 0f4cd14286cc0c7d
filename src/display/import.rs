//! Import result formatting

use crate::models::Money;
use crate::services::{ImportPreview, ImportResult, SkippedRow};

fn format_skipped(skipped: &[SkippedRow], output: &mut String) {
    if skipped.is_empty() {
        return;
    }
    output.push_str(&format!("Skipped {} row(s):\n", skipped.len()));
    for row in skipped {
        output.push_str(&format!("  line {}: {}\n", row.line, row.reason));
    }
}

/// Summary of a completed import
pub fn format_import_result(result: &ImportResult) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Imported {} donation(s) into {} batch(es)\n",
        result.donations_created,
        result.batches.len()
    ));
    for batch in &result.batches {
        output.push_str(&format!("  {} ({}) {}\n", batch.batch_number, batch.id, batch.batch_date));
    }
    output.push_str(&format!("Donors created: {}\n", result.donors_created));
    output.push_str(&format!("Funds created:  {}\n", result.funds_created));
    if result.date_fallbacks > 0 {
        output.push_str(&format!(
            "{} row(s) had an unreadable date and were booked today\n",
            result.date_fallbacks
        ));
    }
    format_skipped(&result.skipped, &mut output);
    output
}

/// Summary of a dry run
pub fn format_import_preview(preview: &ImportPreview, symbol: &str) -> String {
    let mut output = String::new();
    let total: Money = preview.total();
    output.push_str(&format!(
        "Would import {} donation(s) totalling {} into {} batch(es)\n",
        preview.rows.len(),
        total.format_with_symbol(symbol),
        preview.batch_dates().len()
    ));
    for date in preview.batch_dates() {
        let count = preview.rows.iter().filter(|r| r.check_date == date).count();
        output.push_str(&format!("  {}: {} row(s)\n", date, count));
    }
    format_skipped(&preview.skipped, &mut output);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_import_result_lists_skipped_rows() {
        let result = ImportResult {
            donations_created: 3,
            skipped: vec![SkippedRow {
                line: 4,
                reason: "Donor last name cannot be empty".into(),
            }],
            ..ImportResult::default()
        };
        let output = format_import_result(&result);
        assert!(output.contains("Imported 3 donation(s)"));
        assert!(output.contains("line 4: Donor last name cannot be empty"));
    }
}
