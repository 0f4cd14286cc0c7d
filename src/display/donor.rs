//! Donor display formatting

use crate::models::{Alias, DonationLine, Donor};

/// Format donors as a table, in the order given
pub fn format_donor_list(donors: &[Donor]) -> String {
    if donors.is_empty() {
        return "No donors found.\n".to_string();
    }

    let name_width = donors
        .iter()
        .map(|d| d.sort_name().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<8}  {:<name_width$}  {}\n",
        "ID",
        "Name",
        "Statements",
        name_width = name_width
    ));
    output.push_str(&format!(
        "{:-<8}  {:-<name_width$}  {:-<10}\n",
        "",
        "",
        "",
        name_width = name_width
    ));
    for donor in donors {
        output.push_str(&format!(
            "{:<8}  {:<name_width$}  {}\n",
            donor.id.to_string(),
            donor.sort_name(),
            if donor.opt_out { "opted out" } else { "yes" },
            name_width = name_width
        ));
    }
    output
}

/// Format one donor with aliases and giving history
pub fn format_donor_details(
    donor: &Donor,
    aliases: &[Alias],
    donations: &[DonationLine],
    symbol: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Donor: {}\n", donor.full_name()));
    output.push_str(&format!("  ID:          {}\n", donor.id));
    output.push_str(&format!(
        "  Statements:  {}\n",
        if donor.opt_out { "Opted out" } else { "Yes" }
    ));
    output.push_str(&format!(
        "  Created:     {}\n",
        donor.created_at.format("%Y-%m-%d %H:%M UTC")
    ));

    if !aliases.is_empty() {
        output.push_str("  Aliases:\n");
        for alias in aliases {
            output.push_str(&format!(
                "    {} {} ({})\n",
                alias.first_name, alias.last_name, alias.id
            ));
        }
    }

    output.push('\n');
    output.push_str(&super::donation::format_donation_list(donations, symbol));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AliasId, DonorId};
    use chrono::Utc;

    fn donor(first: &str, last: &str, opt_out: bool) -> Donor {
        Donor {
            id: DonorId::new(3),
            first_name: first.into(),
            last_name: last.into(),
            opt_out,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_donor_list() {
        let output = format_donor_list(&[donor("Ann", "Lee", false), donor("Bo", "Ng", true)]);
        assert!(output.contains("Lee, Ann"));
        assert!(output.contains("opted out"));
        assert!(format_donor_list(&[]).contains("No donors found"));
    }

    #[test]
    fn test_format_donor_details() {
        let d = donor("Robert", "Brown", false);
        let aliases = vec![Alias {
            id: AliasId::new(1),
            donor_id: d.id,
            first_name: "Bob".into(),
            last_name: "Brown".into(),
        }];
        let output = format_donor_details(&d, &aliases, &[], "$");
        assert!(output.contains("Donor: Robert Brown"));
        assert!(output.contains("Bob Brown (als-1)"));
    }
}
