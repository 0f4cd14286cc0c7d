//! Check image repository
//!
//! Rows only record where an image file lives; the bytes stay on disk under
//! the images directory.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::error::OffertoryResult;
use crate::models::{BatchId, CheckImage, CheckImageId, DonationId, DonorId};

use super::changes::Table;
use super::database::Database;

const IMAGE_COLUMNS: &str = "id, donation_id, batch_id, donor_id, uri, created_at";

fn image_from_row(row: &Row<'_>) -> rusqlite::Result<CheckImage> {
    Ok(CheckImage {
        id: row.get(0)?,
        donation_id: row.get(1)?,
        batch_id: row.get(2)?,
        donor_id: row.get(3)?,
        uri: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Repository for check image records
#[derive(Clone)]
pub struct CheckImageRepository {
    db: Database,
}

impl CheckImageRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record an image and link it from its donation
    pub fn create(
        &self,
        donation_id: DonationId,
        batch_id: BatchId,
        donor_id: Option<DonorId>,
        uri: &str,
    ) -> OffertoryResult<CheckImage> {
        let created_at = Utc::now();
        let id = self
            .db
            .transaction(&[Table::CheckImages, Table::Donations], |tx| {
                tx.execute(
                    "INSERT INTO check_images (donation_id, batch_id, donor_id, uri, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![donation_id, batch_id, donor_id, uri, created_at],
                )?;
                let id = CheckImageId::new(tx.last_insert_rowid());
                tx.execute(
                    "UPDATE donations SET check_image_id = ?1 WHERE id = ?2",
                    params![id, donation_id],
                )?;
                Ok(id)
            })?;

        Ok(CheckImage {
            id,
            donation_id,
            batch_id,
            donor_id,
            uri: uri.to_string(),
            created_at,
        })
    }

    pub fn get(&self, id: CheckImageId) -> OffertoryResult<Option<CheckImage>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM check_images WHERE id = ?1", IMAGE_COLUMNS),
                    params![id],
                    image_from_row,
                )
                .optional()?)
        })
    }

    pub fn list_by_batch(&self, batch_id: BatchId) -> OffertoryResult<Vec<CheckImage>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM check_images WHERE batch_id = ?1 ORDER BY id",
                IMAGE_COLUMNS
            ))?;
            let images = stmt
                .query_map(params![batch_id], image_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(images)
        })
    }

    pub fn list_by_donation(&self, donation_id: DonationId) -> OffertoryResult<Vec<CheckImage>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM check_images WHERE donation_id = ?1 ORDER BY id",
                IMAGE_COLUMNS
            ))?;
            let images = stmt
                .query_map(params![donation_id], image_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(images)
        })
    }

    /// URIs of every stored image, used to find orphaned files
    pub fn all_uris(&self) -> OffertoryResult<Vec<String>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare("SELECT uri FROM check_images")?;
            let uris = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(uris)
        })
    }

    /// Delete the record; the donation link is cleared by the schema
    pub fn delete(&self, id: CheckImageId) -> OffertoryResult<bool> {
        self.db
            .transaction(&[Table::CheckImages, Table::Donations], |tx| {
                Ok(tx.execute("DELETE FROM check_images WHERE id = ?1", params![id])? > 0)
            })
    }
}
