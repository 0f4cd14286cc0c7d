//! Fund service

use tracing::{debug, info};

use crate::error::{OffertoryError, OffertoryResult};
use crate::models::{Fund, FundDetails, FundId};
use crate::storage::Storage;

/// Fields of a fund edit; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UpdateFundInput {
    pub name: Option<String>,
    pub bank_name: Option<String>,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
}

/// Service for fund management
pub struct FundService<'a> {
    storage: &'a Storage,
}

impl<'a> FundService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a fund with a unique name
    pub fn create(&self, details: FundDetails) -> OffertoryResult<Fund> {
        details.validate().map_err(OffertoryError::Validation)?;
        let name = details.name.trim();

        if self.storage.funds.find_by_name(name)?.is_some() {
            return Err(OffertoryError::Duplicate {
                entity_type: "Fund",
                identifier: name.to_string(),
            });
        }

        let fund = self.storage.funds.create(&details)?;
        info!(fund = %fund.id, name = %fund.name, "fund created");
        Ok(fund)
    }

    pub fn get(&self, id: FundId) -> OffertoryResult<Fund> {
        self.storage
            .funds
            .get(id)?
            .ok_or_else(|| OffertoryError::fund_not_found(id.to_string()))
    }

    pub fn find_by_name(&self, name: &str) -> OffertoryResult<Option<Fund>> {
        self.storage.funds.find_by_name(name.trim())
    }

    /// Find by exact name or `fnd-` id
    pub fn find(&self, identifier: &str) -> OffertoryResult<Fund> {
        if let Some(fund) = self.find_by_name(identifier)? {
            return Ok(fund);
        }
        if let Ok(id) = identifier.parse::<FundId>() {
            if let Some(fund) = self.storage.funds.get(id)? {
                return Ok(fund);
            }
        }
        Err(OffertoryError::fund_not_found(identifier))
    }

    /// Return the fund with exactly this name, creating it with unknown bank
    /// details when absent. The flag tells whether a fund was created.
    pub fn resolve_or_create(&self, name: &str) -> OffertoryResult<(Fund, bool)> {
        let name = name.trim();
        if let Some(fund) = self.storage.funds.find_by_name(name)? {
            return Ok((fund, false));
        }

        let details = FundDetails::with_unknown_bank(name);
        details.validate().map_err(OffertoryError::Validation)?;
        let fund = self.storage.funds.create(&details)?;
        debug!(fund = %fund.id, "fund created on first encounter");
        Ok((fund, true))
    }

    pub fn list(&self) -> OffertoryResult<Vec<Fund>> {
        self.storage.funds.list()
    }

    pub fn update(&self, id: FundId, input: UpdateFundInput) -> OffertoryResult<Fund> {
        let mut fund = self.get(id)?;

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if let Some(existing) = self.storage.funds.find_by_name(&name)? {
                if existing.id != id {
                    return Err(OffertoryError::Duplicate {
                        entity_type: "Fund",
                        identifier: name,
                    });
                }
            }
            fund.name = name;
        }
        if let Some(bank_name) = input.bank_name {
            fund.bank_name = bank_name.trim().to_string();
        }
        if let Some(account_name) = input.account_name {
            fund.account_name = account_name.trim().to_string();
        }
        if let Some(account_number) = input.account_number {
            fund.account_number = account_number.trim().to_string();
        }

        FundDetails {
            name: fund.name.clone(),
            bank_name: fund.bank_name.clone(),
            account_name: fund.account_name.clone(),
            account_number: fund.account_number.clone(),
        }
        .validate()
        .map_err(OffertoryError::Validation)?;

        self.storage.funds.update(&fund)?;
        Ok(fund)
    }

    /// Delete an unused fund other than the default fund
    pub fn delete(&self, id: FundId, default_fund: FundId) -> OffertoryResult<Fund> {
        let fund = self.get(id)?;
        if id == default_fund {
            return Err(OffertoryError::Validation(format!(
                "'{}' is the default fund and cannot be deleted",
                fund.name
            )));
        }

        let donations = self.storage.funds.donation_count(id)?;
        if donations > 0 {
            return Err(OffertoryError::Validation(format!(
                "Fund '{}' has {} donation(s) and cannot be deleted",
                fund.name, donations
            )));
        }

        self.storage.funds.delete(id)?;
        info!(fund = %id, "fund deleted");
        Ok(fund)
    }
}
