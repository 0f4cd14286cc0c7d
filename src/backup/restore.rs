//! Backup restoration for Offertory
//!
//! A backup is an SQL script produced by [`crate::export::dump_sql`]. Restoring
//! executes it against the open database; the script carries its own
//! transaction, so a failing statement leaves the database untouched.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{OffertoryError, OffertoryResult};
use crate::storage::{Storage, Table};

use super::manager::backup_timestamp;

/// Handles restoring from backups
pub struct RestoreManager<'a> {
    storage: &'a Storage,
}

impl<'a> RestoreManager<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Replace all data with the contents of a backup file.
    ///
    /// Take a fresh backup first if the current data may still be needed.
    pub fn restore_from_file(&self, backup_path: &Path) -> OffertoryResult<RestoreResult> {
        let script = read_script(backup_path)?;
        let validation = validate_script(&script);
        if !validation.is_valid() {
            return Err(OffertoryError::Backup(format!(
                "{} is not a usable backup: {}",
                backup_path.display(),
                validation.summary()
            )));
        }

        self.storage.database().execute_script(&script)?;

        let result = RestoreResult {
            backup_date: backup_path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(backup_timestamp),
            rows_restored: validation.insert_count,
        };
        info!(file = %backup_path.display(), rows = result.rows_restored, "backup restored");
        Ok(result)
    }

    /// Validate a backup file without restoring it
    pub fn validate_backup(&self, backup_path: &Path) -> OffertoryResult<ValidationResult> {
        Ok(validate_script(&read_script(backup_path)?))
    }
}

fn read_script(path: &Path) -> OffertoryResult<String> {
    fs::read_to_string(path)
        .map_err(|e| OffertoryError::Io(format!("Failed to read backup file: {}", e)))
}

/// Check the shape of a dump: transaction wrapper and a clearing statement
/// for every table
pub fn validate_script(script: &str) -> ValidationResult {
    let lines: Vec<&str> = script
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let missing_tables = Table::all()
        .iter()
        .map(|t| t.name())
        .filter(|name| {
            let delete = format!("DELETE FROM {};", name);
            !lines.iter().any(|l| *l == delete)
        })
        .collect();

    ValidationResult {
        has_transaction: lines.first() == Some(&"BEGIN TRANSACTION;")
            && lines.last() == Some(&"COMMIT;"),
        missing_tables,
        insert_count: lines.iter().filter(|l| l.starts_with("INSERT INTO ")).count(),
    }
}

/// Result of a restore operation
#[derive(Debug, Default)]
pub struct RestoreResult {
    /// Taken from the backup filename when it follows the naming scheme
    pub backup_date: Option<DateTime<Utc>>,
    pub rows_restored: usize,
}

impl RestoreResult {
    pub fn summary(&self) -> String {
        match self.backup_date {
            Some(date) => format!(
                "Restored {} rows from backup taken {}",
                self.rows_restored,
                date.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => format!("Restored {} rows", self.rows_restored),
        }
    }
}

/// Result of validating a backup
#[derive(Debug)]
pub struct ValidationResult {
    /// Script starts with `BEGIN TRANSACTION;` and ends with `COMMIT;`
    pub has_transaction: bool,
    /// Tables the script does not clear
    pub missing_tables: Vec<&'static str>,
    pub insert_count: usize,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.has_transaction && self.missing_tables.is_empty()
    }

    pub fn summary(&self) -> String {
        if !self.has_transaction {
            "missing transaction wrapper".to_string()
        } else if !self.missing_tables.is_empty() {
            format!("missing tables: {}", self.missing_tables.join(", "))
        } else {
            format!("complete backup with {} rows", self.insert_count)
        }
    }
}
