//! Check image service
//!
//! Image files are copied under `data/images/<uuid>.<ext>`; the row stores
//! the path relative to the data directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::paths::OffertoryPaths;
use crate::error::{OffertoryError, OffertoryResult};
use crate::models::{BatchId, CheckImage, CheckImageId, DonationId};
use crate::services::batch::ensure_open;
use crate::storage::{write_atomic, Storage};

/// Extension used when the source file has none
const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Service for check images
pub struct CheckImageService<'a> {
    storage: &'a Storage,
    paths: &'a OffertoryPaths,
}

impl<'a> CheckImageService<'a> {
    pub fn new(storage: &'a Storage, paths: &'a OffertoryPaths) -> Self {
        Self { storage, paths }
    }

    /// Absolute location of a stored image
    pub fn resolve(&self, image: &CheckImage) -> PathBuf {
        self.paths.data_dir().join(&image.uri)
    }

    /// Copy the file at `source` and attach it to a donation
    pub fn attach_file(&self, donation_id: DonationId, source: &Path) -> OffertoryResult<CheckImage> {
        let bytes = fs::read(source).map_err(|e| {
            OffertoryError::Io(format!("Failed to read image {}: {}", source.display(), e))
        })?;
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(DEFAULT_IMAGE_EXTENSION);
        self.attach_bytes(donation_id, &bytes, extension)
    }

    /// Store image bytes and attach them to a donation in an open batch.
    /// An image already attached to the donation is replaced.
    pub fn attach_bytes(
        &self,
        donation_id: DonationId,
        bytes: &[u8],
        extension: &str,
    ) -> OffertoryResult<CheckImage> {
        let donation = self
            .storage
            .donations
            .get(donation_id)?
            .ok_or_else(|| OffertoryError::donation_not_found(donation_id.to_string()))?;
        let batch = self
            .storage
            .batches
            .get(donation.batch_id)?
            .ok_or_else(|| OffertoryError::batch_not_found(donation.batch_id.to_string()))?;
        ensure_open(&batch)?;

        let extension = extension.trim_start_matches('.').to_lowercase();
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(OffertoryError::Validation(format!(
                "Invalid image extension: '{}'",
                extension
            )));
        }

        let previous = self.storage.check_images.list_by_donation(donation.id)?;

        let uri = format!("images/{}.{}", Uuid::new_v4(), extension);
        let path = self.paths.data_dir().join(&uri);
        write_atomic(&path, bytes)?;

        match self.storage.check_images.create(
            donation.id,
            donation.batch_id,
            Some(donation.donor_id),
            &uri,
        ) {
            Ok(image) => {
                debug!(image = %image.id, donation = %donation.id, "check image attached");
                for old in previous {
                    self.storage.check_images.delete(old.id)?;
                    self.remove_file(&old.uri);
                    debug!(image = %old.id, "replaced check image removed");
                }
                Ok(image)
            }
            Err(e) => {
                // Don't leave an unreferenced file behind
                let _ = fs::remove_file(&path);
                Err(e)
            }
        }
    }

    pub fn get(&self, id: CheckImageId) -> OffertoryResult<CheckImage> {
        self.storage
            .check_images
            .get(id)?
            .ok_or_else(|| OffertoryError::NotFound {
                entity_type: "Check image",
                identifier: id.to_string(),
            })
    }

    pub fn list_by_batch(&self, batch_id: BatchId) -> OffertoryResult<Vec<CheckImage>> {
        self.storage.check_images.list_by_batch(batch_id)
    }

    /// Delete the record and its file
    pub fn delete(&self, id: CheckImageId) -> OffertoryResult<CheckImage> {
        let image = self.get(id)?;
        self.storage.check_images.delete(id)?;
        self.remove_file(&image.uri);
        Ok(image)
    }

    /// Remove image files no row refers to any more, e.g. after a batch was
    /// deleted. Returns the number of files removed.
    pub fn prune_orphans(&self) -> OffertoryResult<usize> {
        let dir = self.paths.images_dir();
        if !dir.exists() {
            return Ok(0);
        }

        let known: std::collections::HashSet<String> =
            self.storage.check_images.all_uris()?.into_iter().collect();

        let entries = fs::read_dir(&dir).map_err(|e| {
            OffertoryError::Io(format!("Failed to read {}: {}", dir.display(), e))
        })?;

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let uri = format!("images/{}", name);
            if path.is_file() && !known.contains(&uri) {
                self.remove_file(&uri);
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn remove_file(&self, uri: &str) {
        let path = self.paths.data_dir().join(uri);
        if let Err(e) = fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "failed to remove check image file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::models::{DonorName, Money};
    use crate::services::{AddDonationInput, BatchService, DonationService};
    use crate::storage::initialize_storage;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup() -> (TempDir, OffertoryPaths, Storage, DonationId, BatchId) {
        let temp_dir = TempDir::new().unwrap();
        let paths = OffertoryPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(&paths).unwrap();
        initialize_storage(&storage).unwrap();

        let settings = Settings::default();
        let admin = storage.users.find_by_username("admin").unwrap().unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 7, 6).unwrap();
        let batch = BatchService::new(&storage, &settings)
            .create(&admin, day)
            .unwrap();
        let donor = storage
            .donors
            .create(&DonorName::new("John", "Smith"))
            .unwrap();
        let donation = DonationService::new(&storage, &settings)
            .add(AddDonationInput {
                batch_id: batch.id,
                donor_id: donor.id,
                fund_id: None,
                check_number: "7".into(),
                amount: Money::from_cents(100),
                check_date: day,
            })
            .unwrap();
        (temp_dir, paths, storage, donation.id, batch.id)
    }

    #[test]
    fn test_attach_and_delete() {
        let (_temp_dir, paths, storage, donation_id, batch_id) = setup();
        let service = CheckImageService::new(&storage, &paths);

        let image = service
            .attach_bytes(donation_id, b"fake-png", ".PNG")
            .unwrap();
        assert!(image.uri.starts_with("images/"));
        assert!(image.uri.ends_with(".png"));
        let file = service.resolve(&image);
        assert_eq!(fs::read(&file).unwrap(), b"fake-png");

        let donation = storage.donations.get(donation_id).unwrap().unwrap();
        assert_eq!(donation.check_image_id, Some(image.id));
        assert_eq!(service.list_by_batch(batch_id).unwrap().len(), 1);

        service.delete(image.id).unwrap();
        assert!(!file.exists());
        let donation = storage.donations.get(donation_id).unwrap().unwrap();
        assert!(donation.check_image_id.is_none());
    }

    #[test]
    fn test_second_attach_replaces_first() {
        let (_temp_dir, paths, storage, donation_id, batch_id) = setup();
        let service = CheckImageService::new(&storage, &paths);

        let first = service.attach_bytes(donation_id, b"front", "jpg").unwrap();
        let first_file = service.resolve(&first);
        let second = service.attach_bytes(donation_id, b"rescan", "jpg").unwrap();

        assert!(!first_file.exists());
        assert!(storage.check_images.get(first.id).unwrap().is_none());
        let images = service.list_by_batch(batch_id).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, second.id);

        let donation = storage.donations.get(donation_id).unwrap().unwrap();
        assert_eq!(donation.check_image_id, Some(second.id));
        assert_eq!(service.prune_orphans().unwrap(), 0);
    }

    #[test]
    fn test_prune_after_batch_delete() {
        let (_temp_dir, paths, storage, donation_id, batch_id) = setup();
        let service = CheckImageService::new(&storage, &paths);
        let image = service.attach_bytes(donation_id, b"img", "jpg").unwrap();
        let file = service.resolve(&image);

        storage.batches.delete(batch_id).unwrap();
        assert!(file.exists());
        assert_eq!(service.prune_orphans().unwrap(), 1);
        assert!(!file.exists());
    }

    #[test]
    fn test_rejects_bad_extension() {
        let (_temp_dir, paths, storage, donation_id, _batch_id) = setup();
        let service = CheckImageService::new(&storage, &paths);
        assert!(service
            .attach_bytes(donation_id, b"x", "../../etc")
            .unwrap_err()
            .is_validation());
    }
}
