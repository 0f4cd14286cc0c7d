//! Fund repository

use rusqlite::{params, OptionalExtension, Row};

use crate::error::OffertoryResult;
use crate::models::{Fund, FundDetails, FundId};

use super::changes::Table;
use super::database::Database;

const FUND_COLUMNS: &str = "id, name, bank_name, account_name, account_number";

fn fund_from_row(row: &Row<'_>) -> rusqlite::Result<Fund> {
    Ok(Fund {
        id: row.get(0)?,
        name: row.get(1)?,
        bank_name: row.get(2)?,
        account_name: row.get(3)?,
        account_number: row.get(4)?,
    })
}

/// Repository for funds
#[derive(Clone)]
pub struct FundRepository {
    db: Database,
}

impl FundRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, details: &FundDetails) -> OffertoryResult<Fund> {
        let name = details.name.trim().to_string();
        let id = self.db.write(Table::Funds, |conn| {
            conn.execute(
                "INSERT INTO funds (name, bank_name, account_name, account_number) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    name,
                    details.bank_name,
                    details.account_name,
                    details.account_number
                ],
            )?;
            Ok(FundId::new(conn.last_insert_rowid()))
        })?;

        Ok(Fund {
            id,
            name,
            bank_name: details.bank_name.clone(),
            account_name: details.account_name.clone(),
            account_number: details.account_number.clone(),
        })
    }

    /// Insert a fund with a fixed id (first-run seed of the default fund)
    pub fn create_with_id(&self, id: FundId, details: &FundDetails) -> OffertoryResult<Fund> {
        self.db.write(Table::Funds, |conn| {
            conn.execute(
                "INSERT INTO funds (id, name, bank_name, account_name, account_number) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id,
                    details.name.trim(),
                    details.bank_name,
                    details.account_name,
                    details.account_number
                ],
            )?;
            Ok(())
        })?;

        Ok(Fund {
            id,
            name: details.name.trim().to_string(),
            bank_name: details.bank_name.clone(),
            account_name: details.account_name.clone(),
            account_number: details.account_number.clone(),
        })
    }

    pub fn get(&self, id: FundId) -> OffertoryResult<Option<Fund>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM funds WHERE id = ?1", FUND_COLUMNS),
                    params![id],
                    fund_from_row,
                )
                .optional()?)
        })
    }

    /// Exact name match
    pub fn find_by_name(&self, name: &str) -> OffertoryResult<Option<Fund>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM funds WHERE name = ?1", FUND_COLUMNS),
                    params![name],
                    fund_from_row,
                )
                .optional()?)
        })
    }

    /// All funds ordered by name
    pub fn list(&self) -> OffertoryResult<Vec<Fund>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM funds ORDER BY name",
                FUND_COLUMNS
            ))?;
            let funds = stmt
                .query_map([], fund_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(funds)
        })
    }

    pub fn update(&self, fund: &Fund) -> OffertoryResult<()> {
        self.db.write(Table::Funds, |conn| {
            conn.execute(
                "UPDATE funds SET name = ?1, bank_name = ?2, account_name = ?3, \
                 account_number = ?4 WHERE id = ?5",
                params![
                    fund.name,
                    fund.bank_name,
                    fund.account_name,
                    fund.account_number,
                    fund.id
                ],
            )?;
            Ok(())
        })
    }

    /// Number of donations booked to the fund
    pub fn donation_count(&self, id: FundId) -> OffertoryResult<i64> {
        self.db.read(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM donations WHERE fund_id = ?1",
                params![id],
                |r| r.get(0),
            )?)
        })
    }

    pub fn delete(&self, id: FundId) -> OffertoryResult<bool> {
        self.db.write(Table::Funds, |conn| {
            Ok(conn.execute("DELETE FROM funds WHERE id = ?1", params![id])? > 0)
        })
    }
}
