//! Path management for Offertory
//!
//! Resolves the locations of the settings file, the SQLite database, stored
//! check images and SQL backups.
//!
//! ## Path Resolution Order
//!
//! 1. `OFFERTORY_DATA_DIR` environment variable (if set)
//! 2. The platform config directory for `offertory`
//!    (`~/.config/offertory` on Linux, `%APPDATA%\offertory\config` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::OffertoryError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "OFFERTORY_DATA_DIR";

/// Manages all paths used by Offertory
#[derive(Debug, Clone)]
pub struct OffertoryPaths {
    /// Base directory for all Offertory data
    base_dir: PathBuf,
}

impl OffertoryPaths {
    /// Create a new OffertoryPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and no
    /// override is set.
    pub fn new() -> Result<Self, OffertoryError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create OffertoryPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the backup directory (`<base>/backups/`)
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Directory holding captured check images
    pub fn images_dir(&self) -> PathBuf {
        self.data_dir().join("images")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the SQLite database
    pub fn database_file(&self) -> PathBuf {
        self.data_dir().join("offertory.db")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), OffertoryError> {
        for dir in [
            self.base_dir.clone(),
            self.data_dir(),
            self.images_dir(),
            self.backup_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                OffertoryError::Io(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }

    /// Check if Offertory has been initialized (database exists)
    pub fn is_initialized(&self) -> bool {
        self.database_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, OffertoryError> {
    ProjectDirs::from("org", "offertory", "offertory")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            OffertoryError::Config(format!(
                "Could not determine a home directory; set {}",
                DATA_DIR_ENV
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = OffertoryPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.backup_dir(), temp_dir.path().join("backups"));
        assert_eq!(
            paths.images_dir(),
            temp_dir.path().join("data").join("images")
        );
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = OffertoryPaths::with_base_dir(temp_dir.path().to_path_buf());

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.images_dir().exists());
        assert!(paths.backup_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = OffertoryPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.database_file(),
            temp_dir.path().join("data").join("offertory.db")
        );
    }
}
