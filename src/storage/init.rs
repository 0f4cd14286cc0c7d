//! Storage initialization
//!
//! Handles first-run setup: the administrator account and the default fund.

use tracing::info;

use crate::crypto::generate_temporary_password;
use crate::error::OffertoryResult;
use crate::models::{FundDetails, FundId, NewUser, Role, DEFAULT_FUND_NAME};

use super::Storage;

/// Username of the seeded administrator
pub const SEED_ADMIN_USERNAME: &str = "admin";

/// What [`initialize_storage`] created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOutcome {
    /// Temporary password of the seeded admin; shown to the operator once
    pub admin_temp_password: Option<String>,
    pub default_fund_created: bool,
}

/// Seed a fresh database.
///
/// Creates the `admin` account with a temporary password when no user
/// exists, and the default fund with id 1 when it is missing. Running it
/// again on a seeded database changes nothing.
pub fn initialize_storage(storage: &Storage) -> OffertoryResult<InitOutcome> {
    let mut outcome = InitOutcome::default();

    if storage.funds.get(FundId::DEFAULT)?.is_none() {
        storage
            .funds
            .create_with_id(FundId::DEFAULT, &FundDetails::with_unknown_bank(DEFAULT_FUND_NAME))?;
        outcome.default_fund_created = true;
        info!(fund = DEFAULT_FUND_NAME, "created default fund");
    }

    if storage.users.count()? == 0 {
        let temp_password = generate_temporary_password();
        storage.users.create(&NewUser {
            username: SEED_ADMIN_USERNAME.into(),
            // No permanent password exists until the first change
            password_hash: String::new(),
            is_temp: true,
            temp_password: Some(temp_password.clone()),
            role: Role::Admin,
            ..NewUser::default()
        })?;
        info!(username = SEED_ADMIN_USERNAME, "created administrator account");
        outcome.admin_temp_password = Some(temp_password);
    }

    Ok(outcome)
}

/// Check if storage still needs its first-run seed
pub fn needs_initialization(storage: &Storage) -> OffertoryResult<bool> {
    Ok(storage.users.count()? == 0 || storage.funds.get(FundId::DEFAULT)?.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::verify_password;

    #[test]
    fn test_initialize_storage() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(needs_initialization(&storage).unwrap());

        let outcome = initialize_storage(&storage).unwrap();
        assert!(outcome.default_fund_created);
        let temp = outcome.admin_temp_password.unwrap();

        let admin = storage
            .users
            .find_by_username(SEED_ADMIN_USERNAME)
            .unwrap()
            .unwrap();
        assert!(admin.is_admin());
        assert!(admin.is_temp);
        assert!(verify_password(&admin, &temp));

        let fund = storage.funds.get(FundId::DEFAULT).unwrap().unwrap();
        assert_eq!(fund.name, DEFAULT_FUND_NAME);
        assert!(!needs_initialization(&storage).unwrap());
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let storage = Storage::open_in_memory().unwrap();
        initialize_storage(&storage).unwrap();

        let outcome = initialize_storage(&storage).unwrap();
        assert_eq!(outcome, InitOutcome::default());
        assert_eq!(storage.users.count().unwrap(), 1);
        assert_eq!(storage.funds.list().unwrap().len(), 1);
    }
}
