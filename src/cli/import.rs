//! CLI command handler for CSV import
//!
//! Rows are grouped into one new batch per check date. With `--dry-run`
//! the file is only parsed and summarized.

use std::path::Path;

use crate::config::settings::Settings;
use crate::display::{format_import_preview, format_import_result};
use crate::error::{OffertoryError, OffertoryResult};
use crate::services::ImportService;
use crate::session::SessionHolder;
use crate::storage::Storage;

/// Handle the import command
pub fn handle_import_command(
    storage: &Storage,
    settings: &Settings,
    session: &SessionHolder,
    file: &Path,
    dry_run: bool,
) -> OffertoryResult<()> {
    let acting = session.require_user()?;
    if !file.exists() {
        return Err(OffertoryError::Import(format!(
            "File not found: {}",
            file.display()
        )));
    }

    let service = ImportService::new(storage, settings);
    let preview = service.preview_file(file)?;

    if dry_run {
        print!(
            "{}",
            format_import_preview(&preview, &settings.currency_symbol)
        );
        println!();
        println!("Dry run: nothing was imported.");
        return Ok(());
    }

    let result = service.import(preview, &acting)?;
    print!("{}", format_import_result(&result));
    Ok(())
}
