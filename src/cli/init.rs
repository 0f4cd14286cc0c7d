//! First-run initialization

use crate::config::paths::OffertoryPaths;
use crate::config::settings::Settings;
use crate::error::OffertoryResult;
use crate::storage::init::SEED_ADMIN_USERNAME;
use crate::storage::{initialize_storage, Storage};

/// Create the data directories, database and seed records
pub fn handle_init_command(paths: &OffertoryPaths) -> OffertoryResult<()> {
    println!("Initializing Offertory at: {}", paths.base_dir().display());

    if !paths.settings_file().exists() {
        Settings::default().save(paths)?;
    }
    let storage = Storage::open(paths)?;
    let outcome = initialize_storage(&storage)?;

    if outcome.default_fund_created {
        println!("Created the default fund.");
    }
    match outcome.admin_temp_password {
        Some(password) => {
            println!("Created administrator account.");
            println!();
            println!("Temporary password for '{}': {}", SEED_ADMIN_USERNAME, password);
            println!("It is shown only once. Log in and change it with 'offertory passwd'.");
        }
        None => println!("Already initialized; nothing to do."),
    }
    Ok(())
}
