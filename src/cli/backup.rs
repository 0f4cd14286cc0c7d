//! Backup CLI commands
//!
//! Implements CLI commands for backup management.

use clap::Subcommand;
use std::path::PathBuf;

use crate::backup::{backup_timestamp, BackupManager, RestoreManager};
use crate::config::paths::OffertoryPaths;
use crate::config::settings::Settings;
use crate::error::{OffertoryError, OffertoryResult};
use crate::session::SessionHolder;
use crate::storage::Storage;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup
    Create,

    /// List all available backups
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Restore from a backup (administrators only)
    Restore {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Check a backup file without restoring it
    Info {
        /// Backup filename or path
        backup: String,
    },

    /// Delete old backups according to retention policy
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    storage: &Storage,
    paths: &OffertoryPaths,
    settings: &Settings,
    session: &SessionHolder,
    cmd: BackupCommands,
) -> OffertoryResult<()> {
    let manager = BackupManager::new(paths, settings.backup_retention.clone());

    match cmd {
        BackupCommands::Create => {
            println!("Creating backup...");
            let (backup, pruned) = manager.create_backup_with_retention(storage)?;
            println!("Backup created: {}", backup.filename);
            println!("Location: {}", backup.path.display());
            if !pruned.is_empty() {
                println!("Pruned {} old backup(s).", pruned.len());
            }
        }

        BackupCommands::List { verbose } => {
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: offertory backup create");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            println!();

            for (i, backup) in backups.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(backup.created_at);
                let age_str = format_duration(age);

                if verbose {
                    println!(
                        "{}. {}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        backup.filename,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(backup.size_bytes),
                        age_str,
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {})",
                        i + 1,
                        backup.filename,
                        age_str,
                        format_size(backup.size_bytes),
                    );
                }
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
        }

        BackupCommands::Restore { backup, force } => {
            session.require_admin()?;
            let backup_path = resolve_backup_path(&manager, paths, &backup)?;

            let restore_manager = RestoreManager::new(storage);
            let validation = restore_manager.validate_backup(&backup_path)?;

            println!("Backup Information");
            println!("==================");
            println!("File: {}", backup_path.display());
            print_created(&backup_path);
            println!("Status: {}", validation.summary());
            println!();

            if !validation.is_valid() {
                return Err(OffertoryError::Backup(format!(
                    "{} is not a usable backup",
                    backup_path.display()
                )));
            }

            if !force {
                println!("WARNING: This will overwrite ALL current data!");
                println!("To proceed, run again with --force flag:");
                println!("  offertory backup restore {} --force", backup);
                return Ok(());
            }

            println!("Creating backup of current data before restore...");
            let pre_restore_backup = manager.create_backup(storage)?;
            println!("Pre-restore backup saved: {}", pre_restore_backup.filename);
            println!();

            println!("Restoring from backup...");
            let result = restore_manager.restore_from_file(&backup_path)?;

            println!("Restore complete!");
            println!("{}", result.summary());
        }

        BackupCommands::Info { backup } => {
            let backup_path = resolve_backup_path(&manager, paths, &backup)?;
            let validation = RestoreManager::new(storage).validate_backup(&backup_path)?;
            let metadata = std::fs::metadata(&backup_path)?;

            println!("Backup Details");
            println!("==============");
            println!("File: {}", backup_path.display());
            println!("Size: {}", format_size(metadata.len()));
            print_created(&backup_path);
            println!("Insert statements: {}", validation.insert_count);
            if !validation.missing_tables.is_empty() {
                println!("Missing tables: {}", validation.missing_tables.join(", "));
            }
            println!();
            println!(
                "Status: {}",
                if validation.is_valid() {
                    "Valid"
                } else {
                    "Invalid"
                }
            );
        }

        BackupCommands::Prune { force } => {
            let backups = manager.list_backups()?;
            let keep_count = settings.backup_retention.keep_count as usize;
            let to_delete = backups.len().saturating_sub(keep_count);

            if to_delete == 0 {
                println!("No backups to prune.");
                println!("Current retention policy: keep {}", keep_count);
                println!("You have {} backup(s).", backups.len());
                return Ok(());
            }

            println!("Prune Summary");
            println!("=============");
            println!("Retention policy: keep {}", keep_count);
            println!("Current backups: {}", backups.len());
            println!("To be deleted: {}", to_delete);
            println!();

            if !force {
                println!("To delete old backups, run again with --force flag:");
                println!("  offertory backup prune --force");
                return Ok(());
            }

            let deleted = manager.enforce_retention()?;
            println!("Deleted {} backup(s).", deleted.len());
        }
    }

    Ok(())
}

fn print_created(path: &std::path::Path) {
    let created = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(backup_timestamp);
    match created {
        Some(at) => println!("Created: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Created: unknown"),
    }
}

/// Resolve a backup identifier to a full path
fn resolve_backup_path(
    manager: &BackupManager,
    paths: &OffertoryPaths,
    backup: &str,
) -> OffertoryResult<PathBuf> {
    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .get_latest_backup()?
            .map(|b| b.path)
            .ok_or_else(|| OffertoryError::NotFound {
                entity_type: "Backup",
                identifier: "latest".to_string(),
            });
    }

    let path = PathBuf::from(backup);
    if path.exists() {
        return Ok(path);
    }

    let backup_path = paths.backup_dir().join(backup);
    if backup_path.exists() {
        return Ok(backup_path);
    }

    let with_ext = paths.backup_dir().join(format!("{}.sql", backup));
    if with_ext.exists() {
        return Ok(with_ext);
    }

    Err(OffertoryError::NotFound {
        entity_type: "Backup",
        identifier: backup.to_string(),
    })
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
