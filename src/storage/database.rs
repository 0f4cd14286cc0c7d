//! Shared SQLite handle
//!
//! A single connection guarded by a mutex is shared by every repository.
//! Writes go through [`Database::write`] or [`Database::transaction`], which
//! publish the touched tables on the change feed once the statement
//! succeeded.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Transaction};
use tracing::debug;

use crate::error::{OffertoryError, OffertoryResult};

use super::changes::{ChangeFeed, Table};
use super::schema;

/// Connection shared by all repositories of one [`super::Storage`]
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    changes: ChangeFeed,
}

impl Database {
    /// Open (or create) the database file and apply migrations
    pub fn open(path: &Path) -> OffertoryResult<Self> {
        let conn = Connection::open(path).map_err(|e| {
            OffertoryError::Database(format!(
                "Failed to open database {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!(path = %path.display(), "opened database");
        Self::from_connection(conn)
    }

    /// Private in-memory database, used by tests
    pub fn open_in_memory() -> OffertoryResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> OffertoryResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            changes: ChangeFeed::new(),
        })
    }

    fn lock(&self) -> OffertoryResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            OffertoryError::Database(format!("Failed to acquire connection lock: {}", e))
        })
    }

    /// Run a read-only query
    pub fn read<T, F>(&self, f: F) -> OffertoryResult<T>
    where
        F: FnOnce(&Connection) -> OffertoryResult<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run a single-statement write and publish `table` on success
    pub fn write<T, F>(&self, table: Table, f: F) -> OffertoryResult<T>
    where
        F: FnOnce(&Connection) -> OffertoryResult<T>,
    {
        let result = {
            let conn = self.lock()?;
            f(&conn)?
        };
        self.changes.publish(table);
        Ok(result)
    }

    /// Run `f` inside a transaction; commits on `Ok`, rolls back on `Err`.
    /// Every table in `tables` is published after the commit.
    pub fn transaction<T, F>(&self, tables: &[Table], f: F) -> OffertoryResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> OffertoryResult<T>,
    {
        let result = {
            let mut conn = self.lock()?;
            let tx = conn.transaction()?;
            let value = f(&tx)?;
            tx.commit()?;
            value
        };
        for table in tables {
            self.changes.publish(*table);
        }
        Ok(result)
    }

    /// Execute a multi-statement SQL script that manages its own transaction.
    ///
    /// A script failing halfway is rolled back. All tables are published
    /// afterwards.
    pub fn execute_script(&self, sql: &str) -> OffertoryResult<()> {
        {
            let conn = self.lock()?;
            if let Err(e) = conn.execute_batch(sql) {
                if !conn.is_autocommit() {
                    conn.execute_batch("ROLLBACK;")?;
                }
                return Err(e.into());
            }
        }
        for table in Table::all() {
            self.changes.publish(table);
        }
        Ok(())
    }

    /// Change notifications for this database
    pub fn changes(&self) -> &ChangeFeed {
        &self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_file_creates_schema() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.db");
        let db = Database::open(&path).unwrap();
        assert!(path.exists());

        let version = db.read(|conn| schema::schema_version(conn)).unwrap();
        assert_eq!(version, schema::SCHEMA_VERSION);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let db = Database::open_in_memory().unwrap();
        let result = db.write(Table::Aliases, |conn| {
            conn.execute(
                "INSERT INTO aliases (donor_id, first_name, last_name) VALUES (99, 'A', 'B')",
                [],
            )?;
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_write_publishes_change() {
        let db = Database::open_in_memory().unwrap();
        let mut rx = db.changes().subscribe();
        db.write(Table::Funds, |conn| {
            conn.execute(
                "INSERT INTO funds (name) VALUES ('Missions')",
                [],
            )?;
            Ok(())
        })
        .unwrap();
        assert_eq!(rx.try_recv().unwrap().table, Table::Funds);
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        let result: OffertoryResult<()> = db.transaction(&[Table::Funds], |tx| {
            tx.execute("INSERT INTO funds (name) VALUES ('Building')", [])?;
            Err(OffertoryError::Validation("abort".into()))
        });
        assert!(result.is_err());

        let count: i64 = db
            .read(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM funds", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_failed_script_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        let script = "BEGIN TRANSACTION;\n\
                      INSERT INTO funds (name) VALUES ('Youth');\n\
                      INSERT INTO no_such_table VALUES (1);\n\
                      COMMIT;\n";
        assert!(db.execute_script(script).is_err());

        let count: i64 = db
            .read(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM funds", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 0);
    }
}
