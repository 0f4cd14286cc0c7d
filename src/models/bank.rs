//! Bank settings model

use serde::{Deserialize, Serialize};

/// Default deposit account, stored as a single row with id 1
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSettings {
    pub bank_name: String,
    pub routing_number: String,
    pub account_name: String,
    pub account_number: String,
}

impl BankSettings {
    /// Account number with all but the last four digits masked
    pub fn masked_account_number(&self) -> String {
        let chars: Vec<char> = self.account_number.chars().collect();
        if chars.len() <= 4 {
            return self.account_number.clone();
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_account_number() {
        let settings = BankSettings {
            account_number: "123456789".into(),
            ..BankSettings::default()
        };
        assert_eq!(settings.masked_account_number(), "*****6789");

        let short = BankSettings {
            account_number: "42".into(),
            ..BankSettings::default()
        };
        assert_eq!(short.masked_account_number(), "42");
    }
}
