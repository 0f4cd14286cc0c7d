//! Storage layer for Offertory
//!
//! A single SQLite database holds every entity. Each repository owns a
//! clone of the shared [`Database`] handle, and every mutation is announced
//! on the [`ChangeFeed`].

pub mod aliases;
pub mod bank_settings;
pub mod batches;
pub mod changes;
pub mod check_images;
pub mod database;
pub mod donations;
pub mod donors;
pub mod file_io;
pub mod funds;
pub mod init;
pub mod schema;
pub mod users;

pub use aliases::AliasRepository;
pub use bank_settings::BankSettingsRepository;
pub use batches::BatchRepository;
pub use changes::{ChangeFeed, LiveQuery, Table, TableChange};
pub use check_images::CheckImageRepository;
pub use database::Database;
pub use donations::{DonationFilter, DonationRepository};
pub use donors::DonorRepository;
pub use file_io::write_atomic;
pub use funds::FundRepository;
pub use init::{initialize_storage, InitOutcome};
pub use users::UserRepository;

use tokio::sync::broadcast;

use crate::config::paths::OffertoryPaths;
use crate::error::OffertoryError;

/// Main storage coordinator that provides access to all repositories
#[derive(Clone)]
pub struct Storage {
    db: Database,
    pub users: UserRepository,
    pub donors: DonorRepository,
    pub aliases: AliasRepository,
    pub funds: FundRepository,
    pub batches: BatchRepository,
    pub donations: DonationRepository,
    pub check_images: CheckImageRepository,
    pub bank_settings: BankSettingsRepository,
}

impl Storage {
    /// Open the database under `paths`, creating directories and applying
    /// migrations as needed
    pub fn open(paths: &OffertoryPaths) -> Result<Self, OffertoryError> {
        paths.ensure_directories()?;
        Ok(Self::with_database(Database::open(&paths.database_file())?))
    }

    /// Storage backed by a private in-memory database
    pub fn open_in_memory() -> Result<Self, OffertoryError> {
        Ok(Self::with_database(Database::open_in_memory()?))
    }

    fn with_database(db: Database) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            donors: DonorRepository::new(db.clone()),
            aliases: AliasRepository::new(db.clone()),
            funds: FundRepository::new(db.clone()),
            batches: BatchRepository::new(db.clone()),
            donations: DonationRepository::new(db.clone()),
            check_images: CheckImageRepository::new(db.clone()),
            bank_settings: BankSettingsRepository::new(db.clone()),
            db,
        }
    }

    /// The shared database handle
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Change feed of this storage
    pub fn changes(&self) -> &ChangeFeed {
        self.db.changes()
    }

    /// Receive a notification for every subsequent write
    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.db.changes().subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DonorName;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_database_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = OffertoryPaths::with_base_dir(temp_dir.path().to_path_buf());

        let storage = Storage::open(&paths).unwrap();
        storage
            .donors
            .create(&DonorName::new("John", "Smith"))
            .unwrap();
        assert!(paths.database_file().exists());
        drop(storage);

        // Data survives reopening
        let reopened = Storage::open(&paths).unwrap();
        assert_eq!(reopened.donors.count().unwrap(), 1);
    }

    #[test]
    fn test_repositories_share_change_feed() {
        let storage = Storage::open_in_memory().unwrap();
        let mut rx = storage.subscribe();

        let donor = storage
            .donors
            .create(&DonorName::new("Ann", "Lee"))
            .unwrap();
        storage
            .aliases
            .create(donor.id, &DonorName::new("Annie", "Lee"))
            .unwrap();

        assert_eq!(rx.try_recv().unwrap().table, Table::Donors);
        assert_eq!(rx.try_recv().unwrap().table, Table::Aliases);
    }
}
