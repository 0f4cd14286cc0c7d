//! Bank settings service

use tracing::info;

use crate::error::{OffertoryError, OffertoryResult};
use crate::models::BankSettings;
use crate::storage::Storage;

/// Service for the deposit bank settings
pub struct BankService<'a> {
    storage: &'a Storage,
}

impl<'a> BankService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The saved settings, or `None` before the first save
    pub fn get(&self) -> OffertoryResult<Option<BankSettings>> {
        self.storage.bank_settings.get()
    }

    /// Replace the settings wholesale
    pub fn save(&self, settings: BankSettings) -> OffertoryResult<BankSettings> {
        let settings = BankSettings {
            bank_name: settings.bank_name.trim().to_string(),
            routing_number: settings.routing_number.trim().to_string(),
            account_name: settings.account_name.trim().to_string(),
            account_number: settings.account_number.trim().to_string(),
        };

        if !settings.routing_number.is_empty()
            && !settings.routing_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(OffertoryError::Validation(format!(
                "Routing number must contain only digits: {}",
                settings.routing_number
            )));
        }

        self.storage.bank_settings.save(&settings)?;
        info!("bank settings saved");
        Ok(settings)
    }
}
