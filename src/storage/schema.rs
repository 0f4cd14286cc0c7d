//! Relational schema and migrations
//!
//! The schema version is tracked in `PRAGMA user_version`. Migrations are
//! applied in order inside a single transaction.

use rusqlite::Connection;
use tracing::info;

use crate::error::OffertoryResult;

/// Schema version written by the latest migration
pub const SCHEMA_VERSION: i64 = 1;

const MIGRATION_V1: &str = "
CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL UNIQUE,
    email           TEXT UNIQUE,
    password_hash   TEXT NOT NULL,
    is_temp         INTEGER NOT NULL DEFAULT 0,
    temp_password   TEXT,
    role            TEXT NOT NULL DEFAULT 'USER' CHECK (role IN ('ADMIN', 'USER')),
    first_name      TEXT NOT NULL DEFAULT '',
    last_name       TEXT NOT NULL DEFAULT '',
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS donors (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name      TEXT NOT NULL,
    last_name       TEXT NOT NULL,
    opt_out         INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_donors_name ON donors (last_name, first_name);

CREATE TABLE IF NOT EXISTS aliases (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    donor_id        INTEGER NOT NULL REFERENCES donors (id) ON DELETE CASCADE,
    first_name      TEXT NOT NULL,
    last_name       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_aliases_name ON aliases (last_name, first_name);

CREATE TABLE IF NOT EXISTS funds (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL UNIQUE,
    bank_name       TEXT NOT NULL DEFAULT '',
    account_name    TEXT NOT NULL DEFAULT '',
    account_number  TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS batches (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    batch_number    TEXT NOT NULL UNIQUE,
    batch_date      TEXT NOT NULL,
    created_by      INTEGER NOT NULL REFERENCES users (id),
    status          TEXT NOT NULL DEFAULT 'open' CHECK (status IN ('open', 'closed')),
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS donations (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    donor_id        INTEGER NOT NULL REFERENCES donors (id),
    batch_id        INTEGER NOT NULL REFERENCES batches (id) ON DELETE CASCADE,
    fund_id         INTEGER NOT NULL DEFAULT 1 REFERENCES funds (id),
    check_number    TEXT NOT NULL DEFAULT '',
    amount          INTEGER NOT NULL CHECK (amount >= 0),
    check_date      TEXT NOT NULL,
    check_image_id  INTEGER REFERENCES check_images (id) ON DELETE SET NULL,
    created_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_donations_batch ON donations (batch_id);
CREATE INDEX IF NOT EXISTS idx_donations_donor ON donations (donor_id);
CREATE INDEX IF NOT EXISTS idx_donations_check_date ON donations (check_date);

CREATE TABLE IF NOT EXISTS check_images (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    donation_id     INTEGER NOT NULL REFERENCES donations (id) ON DELETE CASCADE,
    batch_id        INTEGER NOT NULL REFERENCES batches (id) ON DELETE CASCADE,
    donor_id        INTEGER REFERENCES donors (id) ON DELETE SET NULL,
    uri             TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bank_settings (
    id              INTEGER PRIMARY KEY CHECK (id = 1),
    bank_name       TEXT NOT NULL DEFAULT '',
    routing_number  TEXT NOT NULL DEFAULT '',
    account_name    TEXT NOT NULL DEFAULT '',
    account_number  TEXT NOT NULL DEFAULT ''
);
";

/// Read the schema version of a connection
pub fn schema_version(conn: &Connection) -> OffertoryResult<i64> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

/// Bring the schema up to [`SCHEMA_VERSION`]
pub fn migrate(conn: &mut Connection) -> OffertoryResult<()> {
    let current = schema_version(conn)?;
    if current >= SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    if current < 1 {
        tx.execute_batch(MIGRATION_V1)?;
    }
    tx.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))?;
    tx.commit()?;

    info!(from = current, to = SCHEMA_VERSION, "database schema migrated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_fresh_database() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);

        migrate(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
                 ('users','donors','aliases','funds','batches','donations','check_images','bank_settings')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 8);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_negative_amount_rejected_by_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        let result = conn.execute(
            "INSERT INTO donations (donor_id, batch_id, fund_id, amount, check_date, created_at) \
             VALUES (1, 1, 1, -5, '2025-01-01', '2025-01-01')",
            [],
        );
        assert!(result.is_err());
    }
}
