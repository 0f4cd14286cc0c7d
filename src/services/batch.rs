//! Batch service
//!
//! Lifecycle of a batch: created open with the next number, optionally
//! closed once its deposit is made. Closed batches are read-only and only
//! administrators may delete them.

use chrono::NaiveDate;
use tracing::info;

use crate::config::settings::Settings;
use crate::error::{OffertoryError, OffertoryResult};
use crate::models::{Batch, BatchId, BatchStatus, BatchSummary, Money, User};
use crate::storage::Storage;

/// Fail with `Locked` unless the batch accepts changes
pub fn ensure_open(batch: &Batch) -> OffertoryResult<()> {
    if batch.is_open() {
        Ok(())
    } else {
        Err(OffertoryError::Locked(format!(
            "{} is closed",
            batch.batch_number
        )))
    }
}

/// Service for batch management
pub struct BatchService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> BatchService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// Create an open batch numbered by the configured scheme
    pub fn create(&self, acting: &User, batch_date: NaiveDate) -> OffertoryResult<Batch> {
        let batch = self
            .storage
            .batches
            .create(batch_date, acting.id, self.settings.batch_numbering)?;
        info!(batch = %batch.id, number = %batch.batch_number, "batch created");
        Ok(batch)
    }

    pub fn get(&self, id: BatchId) -> OffertoryResult<Batch> {
        self.storage
            .batches
            .get(id)?
            .ok_or_else(|| OffertoryError::batch_not_found(id.to_string()))
    }

    /// Find by batch number or `bat-` id
    pub fn find(&self, identifier: &str) -> OffertoryResult<Batch> {
        if let Some(batch) = self.storage.batches.find_by_number(identifier.trim())? {
            return Ok(batch);
        }
        if let Some(raw) = identifier.trim().strip_prefix("bat-") {
            if let Ok(id) = raw.parse::<i64>() {
                if let Some(batch) = self.storage.batches.get(BatchId::new(id))? {
                    return Ok(batch);
                }
            }
        }
        Err(OffertoryError::batch_not_found(identifier))
    }

    pub fn list(&self) -> OffertoryResult<Vec<Batch>> {
        self.storage.batches.list()
    }

    /// All batches with totals, newest first
    pub fn list_summaries(&self) -> OffertoryResult<Vec<BatchSummary>> {
        self.storage.batches.list_summaries()
    }

    pub fn summary(&self, id: BatchId) -> OffertoryResult<BatchSummary> {
        let batch = self.get(id)?;
        let (total, donation_count) = self.storage.batches.totals(id)?;
        Ok(BatchSummary {
            batch,
            total,
            donation_count,
        })
    }

    /// Sum and count of a batch's donations
    pub fn totals(&self, id: BatchId) -> OffertoryResult<(Money, i64)> {
        self.get(id)?;
        self.storage.batches.totals(id)
    }

    /// Close an open batch
    pub fn close(&self, id: BatchId) -> OffertoryResult<Batch> {
        let mut batch = self.get(id)?;
        batch.close().map_err(OffertoryError::Validation)?;
        self.storage.batches.set_status(id, BatchStatus::Closed)?;
        info!(batch = %id, "batch closed");
        Ok(batch)
    }

    /// Delete a batch with its donations. Closed batches need an admin.
    pub fn delete(&self, acting: &User, id: BatchId) -> OffertoryResult<Batch> {
        let batch = self.get(id)?;
        if !batch.is_open() && !acting.is_admin() {
            return Err(OffertoryError::PermissionDenied(format!(
                "Batch {} is closed; only administrators can delete it",
                batch.batch_number
            )));
        }

        self.storage.batches.delete(id)?;
        info!(batch = %id, "batch deleted");
        Ok(batch)
    }
}
