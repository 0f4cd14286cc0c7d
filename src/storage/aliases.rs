//! Donor alias repository
//!
//! Aliases are alternate spellings of a donor's name. They only serve
//! lookups and disappear with their donor.

use rusqlite::{params, OptionalExtension, Row};

use crate::error::OffertoryResult;
use crate::models::{Alias, AliasId, DonorId, DonorName};

use super::changes::Table;
use super::database::Database;

fn alias_from_row(row: &Row<'_>) -> rusqlite::Result<Alias> {
    Ok(Alias {
        id: row.get(0)?,
        donor_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
    })
}

/// Repository for donor aliases
#[derive(Clone)]
pub struct AliasRepository {
    db: Database,
}

impl AliasRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, donor_id: DonorId, name: &DonorName) -> OffertoryResult<Alias> {
        let id = self.db.write(Table::Aliases, |conn| {
            conn.execute(
                "INSERT INTO aliases (donor_id, first_name, last_name) VALUES (?1, ?2, ?3)",
                params![donor_id, name.first_name, name.last_name],
            )?;
            Ok(AliasId::new(conn.last_insert_rowid()))
        })?;

        Ok(Alias {
            id,
            donor_id,
            first_name: name.first_name.clone(),
            last_name: name.last_name.clone(),
        })
    }

    pub fn get(&self, id: AliasId) -> OffertoryResult<Option<Alias>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, donor_id, first_name, last_name FROM aliases WHERE id = ?1",
                    params![id],
                    alias_from_row,
                )
                .optional()?)
        })
    }

    pub fn list_for_donor(&self, donor_id: DonorId) -> OffertoryResult<Vec<Alias>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, donor_id, first_name, last_name FROM aliases \
                 WHERE donor_id = ?1 ORDER BY last_name, first_name, id",
            )?;
            let aliases = stmt
                .query_map(params![donor_id], alias_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(aliases)
        })
    }

    /// Donor owning an alias with exactly this name
    pub fn find_donor(&self, name: &DonorName) -> OffertoryResult<Option<DonorId>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    "SELECT donor_id FROM aliases WHERE first_name = ?1 AND last_name = ?2 \
                     ORDER BY id LIMIT 1",
                    params![name.first_name, name.last_name],
                    |row| row.get(0),
                )
                .optional()?)
        })
    }

    pub fn delete(&self, id: AliasId) -> OffertoryResult<bool> {
        self.db.write(Table::Aliases, |conn| {
            Ok(conn.execute("DELETE FROM aliases WHERE id = ?1", params![id])? > 0)
        })
    }
}
