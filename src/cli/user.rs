//! User CLI commands
//!
//! Implements CLI commands for user management. Everything except editing
//! one's own profile requires an administrator.

use clap::Subcommand;

use crate::cli::auth::read_new_password;
use crate::display::{format_user_details, format_user_list};
use crate::error::{OffertoryError, OffertoryResult};
use crate::models::Role;
use crate::services::{AuthService, CreateUserInput, UpdateProfileInput, UserService};
use crate::session::SessionHolder;
use crate::storage::Storage;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user; the password is read from OFFERTORY_NEW_PASSWORD or a prompt
    Create {
        /// Login name
        username: String,
        /// Role (admin or user)
        #[arg(short, long, default_value = "user")]
        role: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value = "")]
        first: String,
        #[arg(long, default_value = "")]
        last: String,
    },
    /// List all users
    List,
    /// Show user details
    Show {
        /// Username or ID
        user: String,
    },
    /// Edit a user's profile
    Edit {
        /// Username or ID
        user: String,
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        last: Option<String>,
        /// New email address (empty to clear)
        #[arg(long)]
        email: Option<String>,
    },
    /// Change a user's role
    Role {
        /// Username or ID
        user: String,
        /// New role (admin or user)
        role: String,
    },
    /// Delete a user
    Delete {
        /// Username or ID
        user: String,
    },
    /// Issue a temporary password
    ResetPassword {
        /// Username or ID
        user: String,
    },
}

fn parse_role(s: &str) -> OffertoryResult<Role> {
    Role::parse(s).ok_or_else(|| {
        OffertoryError::Validation(format!("Invalid role: '{}'. Valid roles: admin, user", s))
    })
}

/// Handle a user command
pub fn handle_user_command(
    storage: &Storage,
    session: &SessionHolder,
    cmd: UserCommands,
) -> OffertoryResult<()> {
    let service = UserService::new(storage);
    let acting = session.require_user()?;

    match cmd {
        UserCommands::Create {
            username,
            role,
            email,
            first,
            last,
        } => {
            let role = parse_role(&role)?;
            // Checked before prompting so non-admins are not asked for a password
            session.require_admin()?;
            let password = read_new_password(&format!("Password for {}: ", username))?;
            let user = service.create(
                &acting,
                CreateUserInput {
                    username,
                    email,
                    password: password.as_str().to_string(),
                    role,
                    first_name: first,
                    last_name: last,
                },
            )?;
            println!("Created user: {} ({})", user.username, user.role);
            println!("  ID: {}", user.id);
        }

        UserCommands::List => {
            let users = service.list()?;
            print!("{}", format_user_list(&users));
        }

        UserCommands::Show { user } => {
            let found = service.find(&user)?;
            print!("{}", format_user_details(&found));
        }

        UserCommands::Edit {
            user,
            first,
            last,
            email,
        } => {
            let found = service.find(&user)?;
            if first.is_none() && last.is_none() && email.is_none() {
                println!("No changes specified.");
                return Ok(());
            }
            let updated = service.update_profile(
                &acting,
                found.id,
                UpdateProfileInput {
                    first_name: first,
                    last_name: last,
                    email: email.map(Some),
                },
            )?;
            println!("Updated user: {}", updated.username);
        }

        UserCommands::Role { user, role } => {
            let found = service.find(&user)?;
            let updated = service.set_role(&acting, found.id, parse_role(&role)?)?;
            println!("{} is now {}", updated.username, updated.role);
        }

        UserCommands::Delete { user } => {
            let found = service.find(&user)?;
            let deleted = service.delete(&acting, found.id)?;
            println!("Deleted user: {}", deleted.username);
        }

        UserCommands::ResetPassword { user } => {
            let found = service.find(&user)?;
            let temp = AuthService::new(storage, session).reset_password(&acting, found.id)?;
            println!("Temporary password for '{}': {}", found.username, temp);
            println!("The user must change it at next login.");
        }
    }

    Ok(())
}
