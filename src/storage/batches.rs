//! Batch repository
//!
//! Batch numbers are computed and inserted under one transaction so two
//! batches never share a number.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::error::OffertoryResult;
use crate::models::batch::date_prefix;
use crate::models::{Batch, BatchId, BatchNumbering, BatchStatus, BatchSummary, Money, UserId};

use super::changes::Table;
use super::database::Database;

const BATCH_COLUMNS: &str = "b.id, b.batch_number, b.batch_date, b.created_by, b.status, b.created_at";

fn batch_from_row(row: &Row<'_>) -> rusqlite::Result<Batch> {
    Ok(Batch {
        id: row.get(0)?,
        batch_number: row.get(1)?,
        batch_date: row.get(2)?,
        created_by: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<BatchSummary> {
    Ok(BatchSummary {
        batch: batch_from_row(row)?,
        total: row.get(6)?,
        donation_count: row.get(7)?,
    })
}

/// Repository for batches
#[derive(Clone)]
pub struct BatchRepository {
    db: Database,
}

impl BatchRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Assign the next batch number and insert an open batch
    pub fn create(
        &self,
        batch_date: NaiveDate,
        created_by: UserId,
        numbering: BatchNumbering,
    ) -> OffertoryResult<Batch> {
        let created_at = Utc::now();
        let (id, batch_number) = self.db.transaction(&[Table::Batches], |tx| {
            let existing: Vec<String> = match numbering {
                BatchNumbering::DatePrefixed => {
                    let pattern = format!("{}-%", date_prefix(batch_date));
                    let mut stmt =
                        tx.prepare("SELECT batch_number FROM batches WHERE batch_number LIKE ?1")?;
                    let numbers = stmt
                        .query_map(params![pattern], |row| row.get(0))?
                        .collect::<Result<Vec<String>, _>>()?;
                    numbers
                }
                BatchNumbering::Sequential => {
                    let mut stmt = tx.prepare("SELECT batch_number FROM batches")?;
                    let numbers = stmt
                        .query_map([], |row| row.get(0))?
                        .collect::<Result<Vec<String>, _>>()?;
                    numbers
                }
            };

            let batch_number = numbering.next_number(batch_date, &existing);
            debug!(%batch_number, existing = existing.len(), "assigned batch number");

            tx.execute(
                "INSERT INTO batches (batch_number, batch_date, created_by, status, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    batch_number,
                    batch_date,
                    created_by,
                    BatchStatus::Open,
                    created_at
                ],
            )?;
            Ok((BatchId::new(tx.last_insert_rowid()), batch_number))
        })?;

        Ok(Batch {
            id,
            batch_number,
            batch_date,
            created_by,
            status: BatchStatus::Open,
            created_at,
        })
    }

    pub fn get(&self, id: BatchId) -> OffertoryResult<Option<Batch>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM batches b WHERE b.id = ?1", BATCH_COLUMNS),
                    params![id],
                    batch_from_row,
                )
                .optional()?)
        })
    }

    pub fn find_by_number(&self, batch_number: &str) -> OffertoryResult<Option<Batch>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    &format!(
                        "SELECT {} FROM batches b WHERE b.batch_number = ?1",
                        BATCH_COLUMNS
                    ),
                    params![batch_number],
                    batch_from_row,
                )
                .optional()?)
        })
    }

    /// All batches, newest first
    pub fn list(&self) -> OffertoryResult<Vec<Batch>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM batches b ORDER BY b.batch_date DESC, b.id DESC",
                BATCH_COLUMNS
            ))?;
            let batches = stmt
                .query_map([], batch_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(batches)
        })
    }

    /// All batches with their totals, newest first
    pub fn list_summaries(&self) -> OffertoryResult<Vec<BatchSummary>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {}, COALESCE(SUM(d.amount), 0), COUNT(d.id) \
                 FROM batches b LEFT JOIN donations d ON d.batch_id = b.id \
                 GROUP BY b.id ORDER BY b.batch_date DESC, b.id DESC",
                BATCH_COLUMNS
            ))?;
            let summaries = stmt
                .query_map([], summary_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(summaries)
        })
    }

    /// Sum and count of the donations in a batch
    pub fn totals(&self, id: BatchId) -> OffertoryResult<(Money, i64)> {
        self.db.read(|conn| {
            Ok(conn.query_row(
                "SELECT COALESCE(SUM(amount), 0), COUNT(*) FROM donations WHERE batch_id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?)
        })
    }

    /// Number of batches created by a user
    pub fn count_created_by(&self, user_id: UserId) -> OffertoryResult<i64> {
        self.db.read(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM batches WHERE created_by = ?1",
                params![user_id],
                |r| r.get(0),
            )?)
        })
    }

    pub fn set_status(&self, id: BatchId, status: BatchStatus) -> OffertoryResult<()> {
        self.db.write(Table::Batches, |conn| {
            conn.execute(
                "UPDATE batches SET status = ?1 WHERE id = ?2",
                params![status, id],
            )?;
            Ok(())
        })
    }

    /// Delete a batch; donations and check images cascade
    pub fn delete(&self, id: BatchId) -> OffertoryResult<bool> {
        self.db
            .transaction(&[Table::Batches, Table::Donations, Table::CheckImages], |tx| {
                Ok(tx.execute("DELETE FROM batches WHERE id = ?1", params![id])? > 0)
            })
    }
}
