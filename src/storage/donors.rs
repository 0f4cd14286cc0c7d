//! Donor repository

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::error::OffertoryResult;
use crate::models::{Donor, DonorId, DonorName};

use super::changes::Table;
use super::database::Database;

const DONOR_COLUMNS: &str = "id, first_name, last_name, opt_out, created_at";

pub(crate) fn donor_from_row(row: &Row<'_>) -> rusqlite::Result<Donor> {
    Ok(Donor {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        opt_out: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Repository for donors
#[derive(Clone)]
pub struct DonorRepository {
    db: Database,
}

impl DonorRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a donor
    pub fn create(&self, name: &DonorName) -> OffertoryResult<Donor> {
        let created_at = Utc::now();
        let id = self.db.write(Table::Donors, |conn| {
            conn.execute(
                "INSERT INTO donors (first_name, last_name, opt_out, created_at) \
                 VALUES (?1, ?2, 0, ?3)",
                params![name.first_name, name.last_name, created_at],
            )?;
            Ok(DonorId::new(conn.last_insert_rowid()))
        })?;

        Ok(Donor {
            id,
            first_name: name.first_name.clone(),
            last_name: name.last_name.clone(),
            opt_out: false,
            created_at,
        })
    }

    pub fn get(&self, id: DonorId) -> OffertoryResult<Option<Donor>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM donors WHERE id = ?1", DONOR_COLUMNS),
                    params![id],
                    donor_from_row,
                )
                .optional()?)
        })
    }

    /// Exact, case-sensitive match on both names. The oldest donor wins if
    /// duplicates exist.
    pub fn find_by_name(&self, name: &DonorName) -> OffertoryResult<Option<Donor>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    &format!(
                        "SELECT {} FROM donors WHERE first_name = ?1 AND last_name = ?2 \
                         ORDER BY id LIMIT 1",
                        DONOR_COLUMNS
                    ),
                    params![name.first_name, name.last_name],
                    donor_from_row,
                )
                .optional()?)
        })
    }

    /// All donors sorted by last name, then first name
    pub fn list(&self) -> OffertoryResult<Vec<Donor>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM donors ORDER BY last_name, first_name, id",
                DONOR_COLUMNS
            ))?;
            let donors = stmt
                .query_map([], donor_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(donors)
        })
    }

    /// Donors whose first or last name contains `query` (case-insensitive)
    pub fn search(&self, query: &str) -> OffertoryResult<Vec<Donor>> {
        let pattern = format!("%{}%", query.trim());
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM donors WHERE first_name LIKE ?1 OR last_name LIKE ?1 \
                 ORDER BY last_name, first_name, id",
                DONOR_COLUMNS
            ))?;
            let donors = stmt
                .query_map(params![pattern], donor_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(donors)
        })
    }

    pub fn update(&self, donor: &Donor) -> OffertoryResult<()> {
        self.db.write(Table::Donors, |conn| {
            conn.execute(
                "UPDATE donors SET first_name = ?1, last_name = ?2, opt_out = ?3 WHERE id = ?4",
                params![donor.first_name, donor.last_name, donor.opt_out, donor.id],
            )?;
            Ok(())
        })
    }

    /// Number of donations referencing the donor
    pub fn donation_count(&self, id: DonorId) -> OffertoryResult<i64> {
        self.db.read(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM donations WHERE donor_id = ?1",
                params![id],
                |r| r.get(0),
            )?)
        })
    }

    pub fn count(&self) -> OffertoryResult<i64> {
        self.db
            .read(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM donors", [], |r| r.get(0))?))
    }

    /// Delete a donor; aliases cascade and image donor links are cleared
    pub fn delete(&self, id: DonorId) -> OffertoryResult<bool> {
        self.db.write(Table::Donors, |conn| {
            Ok(conn.execute("DELETE FROM donors WHERE id = ?1", params![id])? > 0)
        })
    }
}
