//! Bank settings repository
//!
//! A single row with id 1.

use rusqlite::{params, OptionalExtension};

use crate::error::OffertoryResult;
use crate::models::BankSettings;

use super::changes::Table;
use super::database::Database;

/// Repository for the deposit bank settings
#[derive(Clone)]
pub struct BankSettingsRepository {
    db: Database,
}

impl BankSettingsRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The stored settings, if any were ever saved
    pub fn get(&self) -> OffertoryResult<Option<BankSettings>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    "SELECT bank_name, routing_number, account_name, account_number \
                     FROM bank_settings WHERE id = 1",
                    [],
                    |row| {
                        Ok(BankSettings {
                            bank_name: row.get(0)?,
                            routing_number: row.get(1)?,
                            account_name: row.get(2)?,
                            account_number: row.get(3)?,
                        })
                    },
                )
                .optional()?)
        })
    }

    /// Replace the singleton row
    pub fn save(&self, settings: &BankSettings) -> OffertoryResult<()> {
        self.db.write(Table::BankSettings, |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO bank_settings \
                 (id, bank_name, routing_number, account_name, account_number) \
                 VALUES (1, ?1, ?2, ?3, ?4)",
                params![
                    settings.bank_name,
                    settings.routing_number,
                    settings.account_name,
                    settings.account_number
                ],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_replaces_singleton() {
        let repo = BankSettingsRepository::new(Database::open_in_memory().unwrap());
        assert!(repo.get().unwrap().is_none());

        let first = BankSettings {
            bank_name: "First Bank".into(),
            routing_number: "011000015".into(),
            account_name: "Grace Church".into(),
            account_number: "12345678".into(),
        };
        repo.save(&first).unwrap();
        assert_eq!(repo.get().unwrap(), Some(first));

        let second = BankSettings {
            bank_name: "Second Bank".into(),
            ..BankSettings::default()
        };
        repo.save(&second).unwrap();
        assert_eq!(repo.get().unwrap(), Some(second));

        let rows: i64 = repo
            .db
            .read(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM bank_settings", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(rows, 1);
    }
}
