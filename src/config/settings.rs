//! User settings for Offertory
//!
//! Manages preferences including the batch numbering scheme, the default fund
//! and backup retention.

use serde::{Deserialize, Serialize};

use super::paths::OffertoryPaths;
use crate::error::OffertoryError;
use crate::models::{BatchNumbering, FundId};

/// Backup retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of SQL dumps to keep when pruning
    pub keep_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self { keep_count: 30 }
    }
}

/// User settings for Offertory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// How new batches are numbered
    #[serde(default)]
    pub batch_numbering: BatchNumbering,

    /// Fund used when a donation or import row names none
    #[serde(default = "default_fund_id")]
    pub default_fund_id: FundId,

    /// Default currency symbol
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Printed at the top of statements and deposit reports
    #[serde(default = "default_organization_name")]
    pub organization_name: String,

    /// Backup retention policy
    #[serde(default)]
    pub backup_retention: BackupRetention,
}

fn default_schema_version() -> u32 {
    1
}

fn default_fund_id() -> FundId {
    FundId::DEFAULT
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_organization_name() -> String {
    "Our Church".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            batch_numbering: BatchNumbering::default(),
            default_fund_id: default_fund_id(),
            currency_symbol: default_currency(),
            organization_name: default_organization_name(),
            backup_retention: BackupRetention::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &OffertoryPaths) -> Result<Self, OffertoryError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                OffertoryError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                OffertoryError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &OffertoryPaths) -> Result<(), OffertoryError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            OffertoryError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| OffertoryError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
