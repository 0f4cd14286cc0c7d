//! Backup system for Offertory
//!
//! Backups are SQL dumps of the whole database written to the backup
//! directory, with a keep-count retention policy and restore.
//!
//! # Backup Format
//!
//! A plain-text script: `BEGIN TRANSACTION;`, a `DELETE FROM` for every
//! table (children first), one `INSERT INTO` per row (parents first), then
//! `COMMIT;`. Files are named `offertory-backup-YYYYMMDD-HHMMSS-mmm.sql`.
//!
//! # Example
//!
//! ```rust,ignore
//! use offertory::backup::{BackupManager, RestoreManager};
//!
//! let manager = BackupManager::new(&paths, settings.backup_retention.clone());
//! let (backup, _pruned) = manager.create_backup_with_retention(&storage)?;
//!
//! // Later, restore from backup
//! let result = RestoreManager::new(&storage).restore_from_file(&backup.path)?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;

pub use manager::{backup_filename, backup_timestamp, BackupInfo, BackupManager};
pub use restore::{validate_script, RestoreManager, RestoreResult, ValidationResult};
