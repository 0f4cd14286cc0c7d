use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use offertory::cli::{
    authenticate, handle_backup_command, handle_bank_command, handle_batch_command,
    handle_config_command, handle_dashboard_command, handle_donation_command,
    handle_donor_command, handle_export_command, handle_fund_command, handle_import_command,
    handle_init_command, handle_login_command, handle_passwd_command, handle_report_command,
    handle_user_command,
};
use offertory::config::{paths::OffertoryPaths, settings::Settings};
use offertory::session::SessionHolder;
use offertory::storage::Storage;

/// Environment variable holding the log filter
const LOG_ENV: &str = "OFFERTORY_LOG";

#[derive(Parser)]
#[command(
    name = "offertory",
    version,
    about = "Church donation tracking from the command line",
    long_about = "Offertory records checks received by a congregation in dated batches, \
                  keeps donors and funds, imports and exports CSV, and prints deposit \
                  reports and yearly giving statements."
)]
struct Cli {
    /// Acting user
    #[arg(short, long, global = true, env = "OFFERTORY_USER")]
    user: Option<String>,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database, the default fund and the admin account
    Init,

    /// Check credentials
    Login,

    /// Change your password
    Passwd,

    /// Show or change settings
    #[command(subcommand)]
    Config(offertory::cli::ConfigCommands),

    /// User management commands
    #[command(subcommand)]
    User(offertory::cli::UserCommands),

    /// Donor management commands
    #[command(subcommand)]
    Donor(offertory::cli::DonorCommands),

    /// Fund management commands
    #[command(subcommand)]
    Fund(offertory::cli::FundCommands),

    /// Batch management commands
    #[command(subcommand)]
    Batch(offertory::cli::BatchCommands),

    /// Donation (check) commands
    #[command(subcommand, alias = "check")]
    Donation(offertory::cli::DonationCommands),

    /// Import donations from CSV, one batch per check date
    Import {
        /// Path to CSV file
        file: PathBuf,
        /// Parse and summarize without importing
        #[arg(long)]
        dry_run: bool,
    },

    /// Export donations or the whole database
    #[command(subcommand)]
    Export(offertory::cli::ExportCommands),

    /// Backup management commands
    #[command(subcommand)]
    Backup(offertory::cli::BackupCommands),

    /// Deposit bank settings
    #[command(subcommand)]
    Bank(offertory::cli::BankCommands),

    /// Month, quarter and year to date totals
    Dashboard {
        /// Reference date (defaults to today)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Deposit reports and giving statements
    #[command(subcommand)]
    Report(offertory::cli::ReportCommands),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = OffertoryPaths::new()?;

    let Some(command) = cli.command else {
        println!("Offertory - church donation tracking");
        println!();
        println!("Run 'offertory --help' for usage information.");
        if !paths.is_initialized() {
            println!("Run 'offertory init' to get started.");
        }
        return Ok(());
    };

    if let Commands::Init = command {
        handle_init_command(&paths)?;
        return Ok(());
    }

    if !paths.is_initialized() {
        bail!(
            "No database at {}; run 'offertory init' first",
            paths.database_file().display()
        );
    }

    let settings = Settings::load_or_create(&paths)?;
    let storage = Storage::open(&paths)?;
    let session = SessionHolder::new();
    let user = cli.user.as_deref();

    match command {
        Commands::Login => return Ok(handle_login_command(&storage, &session, user)?),
        Commands::Passwd => return Ok(handle_passwd_command(&storage, &session, user)?),
        _ => {}
    }

    authenticate(&storage, &session, user)?;

    match command {
        Commands::Init | Commands::Login | Commands::Passwd => {}
        Commands::Config(cmd) => {
            handle_config_command(&paths, &storage, &session, settings, cmd)?;
        }
        Commands::User(cmd) => {
            handle_user_command(&storage, &session, cmd)?;
        }
        Commands::Donor(cmd) => {
            handle_donor_command(&storage, &settings, cmd)?;
        }
        Commands::Fund(cmd) => {
            handle_fund_command(&storage, &settings, cmd)?;
        }
        Commands::Batch(cmd) => {
            handle_batch_command(&storage, &settings, &paths, &session, cmd)?;
        }
        Commands::Donation(cmd) => {
            handle_donation_command(&storage, &settings, &paths, cmd)?;
        }
        Commands::Import { file, dry_run } => {
            handle_import_command(&storage, &settings, &session, &file, dry_run)?;
        }
        Commands::Export(cmd) => {
            handle_export_command(&storage, &settings, cmd)?;
        }
        Commands::Backup(cmd) => {
            handle_backup_command(&storage, &paths, &settings, &session, cmd)?;
        }
        Commands::Bank(cmd) => {
            handle_bank_command(&storage, &session, cmd)?;
        }
        Commands::Dashboard { as_of } => {
            handle_dashboard_command(&storage, &settings, as_of.as_deref())?;
        }
        Commands::Report(cmd) => {
            handle_report_command(&storage, &settings, cmd)?;
        }
    }

    Ok(())
}
