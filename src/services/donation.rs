//! Donation service
//!
//! Entry and editing of checks within a batch. Every mutation requires the
//! batch to be open.

use chrono::NaiveDate;
use tracing::debug;

use crate::config::settings::Settings;
use crate::error::{OffertoryError, OffertoryResult};
use crate::models::{
    BatchId, Donation, DonationDetails, DonationId, DonationLine, DonorId, FundId, Money,
};
use crate::services::batch::ensure_open;
use crate::storage::{DonationFilter, Storage};

/// Input for adding a donation to a batch
#[derive(Debug, Clone)]
pub struct AddDonationInput {
    pub batch_id: BatchId,
    pub donor_id: DonorId,
    /// Falls back to the configured default fund
    pub fund_id: Option<FundId>,
    pub check_number: String,
    pub amount: Money,
    pub check_date: NaiveDate,
}

/// Fields of a donation edit; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UpdateDonationInput {
    pub donor_id: Option<DonorId>,
    pub fund_id: Option<FundId>,
    pub check_number: Option<String>,
    pub amount: Option<Money>,
    pub check_date: Option<NaiveDate>,
}

/// Service for donation management
pub struct DonationService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> DonationService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    fn open_batch(&self, batch_id: BatchId) -> OffertoryResult<()> {
        let batch = self
            .storage
            .batches
            .get(batch_id)?
            .ok_or_else(|| OffertoryError::batch_not_found(batch_id.to_string()))?;
        ensure_open(&batch)
    }

    fn check_references(&self, details: &DonationDetails) -> OffertoryResult<()> {
        if self.storage.donors.get(details.donor_id)?.is_none() {
            return Err(OffertoryError::donor_not_found(details.donor_id.to_string()));
        }
        if self.storage.funds.get(details.fund_id)?.is_none() {
            return Err(OffertoryError::fund_not_found(details.fund_id.to_string()));
        }
        details.validate().map_err(OffertoryError::Validation)
    }

    /// Add a check to an open batch
    pub fn add(&self, input: AddDonationInput) -> OffertoryResult<Donation> {
        self.open_batch(input.batch_id)?;

        let details = DonationDetails {
            donor_id: input.donor_id,
            batch_id: input.batch_id,
            fund_id: input.fund_id.unwrap_or(self.settings.default_fund_id),
            check_number: input.check_number.trim().to_string(),
            amount: input.amount,
            check_date: input.check_date,
        };
        self.check_references(&details)?;

        let donation = self.storage.donations.create(&details)?;
        debug!(donation = %donation.id, batch = %donation.batch_id, "donation added");
        Ok(donation)
    }

    pub fn get(&self, id: DonationId) -> OffertoryResult<Donation> {
        self.storage
            .donations
            .get(id)?
            .ok_or_else(|| OffertoryError::donation_not_found(id.to_string()))
    }

    /// Edit a donation in an open batch
    pub fn update(&self, id: DonationId, input: UpdateDonationInput) -> OffertoryResult<Donation> {
        let donation = self.get(id)?;
        self.open_batch(donation.batch_id)?;

        let details = DonationDetails {
            donor_id: input.donor_id.unwrap_or(donation.donor_id),
            batch_id: donation.batch_id,
            fund_id: input.fund_id.unwrap_or(donation.fund_id),
            check_number: input
                .check_number
                .map(|n| n.trim().to_string())
                .unwrap_or(donation.check_number.clone()),
            amount: input.amount.unwrap_or(donation.amount),
            check_date: input.check_date.unwrap_or(donation.check_date),
        };
        self.check_references(&details)?;

        self.storage.donations.update(id, &details)?;
        Ok(Donation {
            donor_id: details.donor_id,
            fund_id: details.fund_id,
            check_number: details.check_number,
            amount: details.amount,
            check_date: details.check_date,
            ..donation
        })
    }

    /// Remove a donation from an open batch
    pub fn delete(&self, id: DonationId) -> OffertoryResult<Donation> {
        let donation = self.get(id)?;
        self.open_batch(donation.batch_id)?;
        self.storage.donations.delete(id)?;
        debug!(donation = %id, "donation deleted");
        Ok(donation)
    }

    /// Donations matching every criterion of `filter`, ordered by check date
    pub fn list(&self, filter: &DonationFilter) -> OffertoryResult<Vec<DonationLine>> {
        self.storage.donations.lines(filter)
    }

    pub fn list_by_batch(&self, batch_id: BatchId) -> OffertoryResult<Vec<DonationLine>> {
        self.storage.donations.list_by_batch(batch_id)
    }

    pub fn list_by_donor(&self, donor_id: DonorId) -> OffertoryResult<Vec<DonationLine>> {
        self.storage.donations.list_by_donor(donor_id)
    }

    /// Donations with a check date within the inclusive range
    pub fn list_between(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> OffertoryResult<Vec<DonationLine>> {
        self.storage
            .donations
            .lines(&DonationFilter::between(from, to))
    }
}
