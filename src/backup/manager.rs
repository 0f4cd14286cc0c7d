//! Backup manager for Offertory
//!
//! Writes SQL dumps of the database into the backup directory and prunes
//! old dumps down to the configured keep count.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::paths::OffertoryPaths;
use crate::config::settings::BackupRetention;
use crate::error::{OffertoryError, OffertoryResult};
use crate::export::dump_sql;
use crate::storage::{write_atomic, Storage};

const BACKUP_PREFIX: &str = "offertory-backup-";
const BACKUP_EXTENSION: &str = "sql";

/// Metadata about a backup
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    /// Backup filename
    pub filename: String,
    /// Full path to backup
    pub path: PathBuf,
    /// When the backup was created
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
}

/// Manages backup creation and retention
pub struct BackupManager {
    backup_dir: PathBuf,
    retention: BackupRetention,
}

impl BackupManager {
    /// Create a new BackupManager
    pub fn new(paths: &OffertoryPaths, retention: BackupRetention) -> Self {
        Self {
            backup_dir: paths.backup_dir(),
            retention,
        }
    }

    /// Dump the database into a new backup file
    pub fn create_backup(&self, storage: &Storage) -> OffertoryResult<BackupInfo> {
        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            OffertoryError::Io(format!("Failed to create backup directory: {}", e))
        })?;

        let now = Utc::now();
        let filename = backup_filename(now);
        let path = self.backup_dir.join(&filename);

        let mut script = Vec::new();
        let stats = dump_sql(storage.database(), &mut script)?;
        write_atomic(&path, &script)?;

        info!(file = %filename, rows = stats.total_rows(), "backup created");
        Ok(BackupInfo {
            filename,
            path,
            created_at: now,
            size_bytes: script.len() as u64,
        })
    }

    /// List all available backups, newest first
    pub fn list_backups(&self) -> OffertoryResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir).map_err(|e| {
            OffertoryError::Io(format!("Failed to read backup directory: {}", e))
        })? {
            let entry = entry.map_err(|e| {
                OffertoryError::Io(format!("Failed to read directory entry: {}", e))
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == BACKUP_EXTENSION) {
                if let Some(info) = parse_backup_info(&path) {
                    backups.push(info);
                }
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(backups)
    }

    /// Delete backups beyond the keep count, oldest first
    pub fn enforce_retention(&self) -> OffertoryResult<Vec<PathBuf>> {
        let backups = self.list_backups()?;
        let mut deleted = Vec::new();

        for backup in backups
            .into_iter()
            .skip(self.retention.keep_count as usize)
        {
            fs::remove_file(&backup.path).map_err(|e| {
                OffertoryError::Io(format!("Failed to delete old backup: {}", e))
            })?;
            deleted.push(backup.path);
        }

        if !deleted.is_empty() {
            info!(count = deleted.len(), "pruned old backups");
        }
        Ok(deleted)
    }

    /// Create a backup and then enforce retention policy
    pub fn create_backup_with_retention(
        &self,
        storage: &Storage,
    ) -> OffertoryResult<(BackupInfo, Vec<PathBuf>)> {
        let backup = self.create_backup(storage)?;
        let deleted = self.enforce_retention()?;
        Ok((backup, deleted))
    }

    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    /// Look up a backup by filename
    pub fn get_backup(&self, filename: &str) -> OffertoryResult<Option<BackupInfo>> {
        let path = self.backup_dir.join(filename);
        if path.exists() {
            Ok(parse_backup_info(&path))
        } else {
            Ok(None)
        }
    }

    pub fn get_latest_backup(&self) -> OffertoryResult<Option<BackupInfo>> {
        let backups = self.list_backups()?;
        Ok(backups.into_iter().next())
    }
}

/// `offertory-backup-YYYYMMDD-HHMMSS-mmm.sql`
pub fn backup_filename(at: DateTime<Utc>) -> String {
    format!(
        "{}{}-{:03}.{}",
        BACKUP_PREFIX,
        at.format("%Y%m%d-%H%M%S"),
        at.timestamp_subsec_millis(),
        BACKUP_EXTENSION
    )
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();
    let created_at = backup_timestamp(&filename)?;
    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
    })
}

/// Creation time encoded in a backup filename
pub fn backup_timestamp(filename: &str) -> Option<DateTime<Utc>> {
    let date_part = filename
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(BACKUP_EXTENSION)?
        .strip_suffix('.')?;
    parse_backup_timestamp(date_part)
}

/// Parse `YYYYMMDD-HHMMSS` or `YYYYMMDD-HHMMSS-mmm`
fn parse_backup_timestamp(date_str: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let date_part = parts[0];
    let time_part = parts[1];
    let millis: u32 = if parts.len() == 3 {
        parts[2].parse().ok()?
    } else {
        0
    };

    if date_part.len() != 8 || time_part.len() != 6 {
        return None;
    }

    let year: i32 = date_part[0..4].parse().ok()?;
    let month: u32 = date_part[4..6].parse().ok()?;
    let day: u32 = date_part[6..8].parse().ok()?;
    let hour: u32 = time_part[0..2].parse().ok()?;
    let minute: u32 = time_part[2..4].parse().ok()?;
    let second: u32 = time_part[4..6].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = chrono::NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;
    let datetime = chrono::NaiveDateTime::new(date, time);

    Some(DateTime::from_naive_utc_and_offset(datetime, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use tempfile::TempDir;

    use crate::storage::initialize_storage;

    fn create_test_manager(keep_count: u32) -> (BackupManager, Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = OffertoryPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(&paths).unwrap();
        initialize_storage(&storage).unwrap();

        let manager = BackupManager::new(&paths, BackupRetention { keep_count });
        (manager, storage, temp_dir)
    }

    #[test]
    fn test_create_backup() {
        let (manager, storage, _temp) = create_test_manager(3);

        let backup = manager.create_backup(&storage).unwrap();
        assert!(backup.path.exists());
        assert!(backup.filename.starts_with("offertory-backup-"));
        assert!(backup.filename.ends_with(".sql"));

        let contents = fs::read_to_string(&backup.path).unwrap();
        assert!(contents.starts_with("BEGIN TRANSACTION;"));
        assert!(contents.contains("'General Fund'"));
    }

    #[test]
    fn test_list_backups() {
        let (manager, storage, _temp) = create_test_manager(3);

        manager.create_backup(&storage).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        manager.create_backup(&storage).unwrap();

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 2);
        assert!(backups[0].created_at >= backups[1].created_at);
    }

    #[test]
    fn test_retention_policy() {
        let (manager, storage, _temp) = create_test_manager(3);

        for _ in 0..5 {
            manager.create_backup(&storage).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(20));
        }

        let deleted = manager.enforce_retention().unwrap();
        assert_eq!(deleted.len(), 2);

        let remaining = manager.list_backups().unwrap();
        assert_eq!(remaining.len(), 3);
    }

    #[test]
    fn test_get_latest_backup() {
        let (manager, storage, _temp) = create_test_manager(3);
        assert!(manager.get_latest_backup().unwrap().is_none());

        let backup = manager.create_backup(&storage).unwrap();
        let latest = manager.get_latest_backup().unwrap().unwrap();
        assert_eq!(latest.path, backup.path);
    }

    #[test]
    fn test_filename_round_trip() {
        let at = DateTime::parse_from_rfc3339("2025-11-27T14:30:22.456Z")
            .unwrap()
            .with_timezone(&Utc);
        let name = backup_filename(at);
        assert_eq!(name, "offertory-backup-20251127-143022-456.sql");

        let parsed = backup_timestamp(&name).unwrap();
        assert_eq!(parsed, at);
        assert_eq!(parsed.year(), 2025);
        assert_eq!(parsed.hour(), 14);

        assert!(backup_timestamp("notes.sql").is_none());
        assert!(parse_backup_timestamp("20251127-143022").is_some());
    }

    #[test]
    fn test_foreign_files_ignored() {
        let (manager, _storage, _temp) = create_test_manager(3);
        fs::write(manager.backup_dir().join("readme.sql"), "--").unwrap();
        assert!(manager.list_backups().unwrap().is_empty());
    }
}
