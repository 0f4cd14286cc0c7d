//! Configuration CLI commands

use clap::Subcommand;

use crate::config::paths::OffertoryPaths;
use crate::config::settings::Settings;
use crate::error::{OffertoryError, OffertoryResult};
use crate::models::{BatchNumbering, FundId};
use crate::session::SessionHolder;
use crate::storage::Storage;

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show paths and settings
    Show,
    /// Change a setting (administrators only)
    Set {
        /// One of: batch_numbering, default_fund_id, currency_symbol,
        /// organization_name, backup_keep_count
        key: String,
        /// New value
        value: String,
    },
}

/// Handle a config command
pub fn handle_config_command(
    paths: &OffertoryPaths,
    storage: &Storage,
    session: &SessionHolder,
    mut settings: Settings,
    cmd: ConfigCommands,
) -> OffertoryResult<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("Offertory Configuration");
            println!("=======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Database:         {}", paths.database_file().display());
            println!("Images:           {}", paths.images_dir().display());
            println!("Backups:          {}", paths.backup_dir().display());
            println!();
            println!("Settings:");
            println!("  batch_numbering:   {}", settings.batch_numbering);
            println!("  default_fund_id:   {}", settings.default_fund_id.value());
            println!("  currency_symbol:   {}", settings.currency_symbol);
            println!("  organization_name: {}", settings.organization_name);
            println!(
                "  backup_keep_count: {}",
                settings.backup_retention.keep_count
            );
        }

        ConfigCommands::Set { key, value } => {
            session.require_admin()?;
            apply_setting(&mut settings, storage, &key, &value)?;
            settings.save(paths)?;
            println!("Set {} = {}", key, value);
        }
    }

    Ok(())
}

fn apply_setting(
    settings: &mut Settings,
    storage: &Storage,
    key: &str,
    value: &str,
) -> OffertoryResult<()> {
    match key {
        "batch_numbering" => {
            settings.batch_numbering = BatchNumbering::parse(value).ok_or_else(|| {
                OffertoryError::Validation(format!(
                    "Invalid batch numbering: '{}'. Valid values: date_prefixed, sequential",
                    value
                ))
            })?;
        }
        "default_fund_id" => {
            let id: FundId = value.parse().map_err(|_| {
                OffertoryError::Validation(format!("Invalid fund id: '{}'", value))
            })?;
            if storage.funds.get(id)?.is_none() {
                return Err(OffertoryError::fund_not_found(value));
            }
            settings.default_fund_id = id;
        }
        "currency_symbol" => settings.currency_symbol = value.to_string(),
        "organization_name" => settings.organization_name = value.trim().to_string(),
        "backup_keep_count" => {
            settings.backup_retention.keep_count = value.parse().map_err(|_| {
                OffertoryError::Validation(format!("Invalid keep count: '{}'", value))
            })?;
        }
        other => {
            return Err(OffertoryError::Validation(format!(
                "Unknown setting: '{}'",
                other
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::initialize_storage;

    #[test]
    fn test_apply_setting() {
        let storage = Storage::open_in_memory().unwrap();
        initialize_storage(&storage).unwrap();
        let mut settings = Settings::default();

        apply_setting(&mut settings, &storage, "batch_numbering", "sequential").unwrap();
        assert_eq!(settings.batch_numbering, BatchNumbering::Sequential);

        apply_setting(&mut settings, &storage, "backup_keep_count", "5").unwrap();
        assert_eq!(settings.backup_retention.keep_count, 5);

        assert!(apply_setting(&mut settings, &storage, "default_fund_id", "42")
            .unwrap_err()
            .is_not_found());
        assert!(apply_setting(&mut settings, &storage, "colour", "red").is_err());
    }
}
