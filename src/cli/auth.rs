//! Authentication for CLI commands
//!
//! Each invocation is its own session: the user named by `--user` (or
//! `OFFERTORY_USER`) is logged in before the command runs.

use crate::crypto::SecureString;
use crate::error::{OffertoryError, OffertoryResult};
use crate::models::User;
use crate::services::AuthService;
use crate::session::SessionHolder;
use crate::storage::Storage;

/// Environment variable naming the acting user
pub const USER_ENV: &str = "OFFERTORY_USER";

/// Environment variable carrying the password, skipping the prompt
pub const PASSWORD_ENV: &str = "OFFERTORY_PASSWORD";

/// Environment variable carrying a new password for `passwd` and `user create`
pub const NEW_PASSWORD_ENV: &str = "OFFERTORY_NEW_PASSWORD";

/// Read a password from `env`, falling back to a hidden terminal prompt
pub fn read_password(prompt: &str, env: &str) -> OffertoryResult<SecureString> {
    if let Ok(value) = std::env::var(env) {
        return Ok(SecureString::new(value));
    }
    let entered = rpassword::prompt_password(prompt)
        .map_err(|e| OffertoryError::Io(format!("Failed to read password: {}", e)))?;
    Ok(SecureString::new(entered))
}

/// Read a new password, asking twice when prompting
pub fn read_new_password(prompt: &str) -> OffertoryResult<SecureString> {
    if let Ok(value) = std::env::var(NEW_PASSWORD_ENV) {
        return Ok(SecureString::new(value));
    }
    let first = read_password(prompt, NEW_PASSWORD_ENV)?;
    let confirm = rpassword::prompt_password("Confirm password: ")
        .map_err(|e| OffertoryError::Io(format!("Failed to read password: {}", e)))?;
    if first.as_str() != confirm {
        return Err(OffertoryError::Validation("Passwords do not match".into()));
    }
    Ok(first)
}

/// Log `username` in and return the user
pub fn authenticate(
    storage: &Storage,
    session: &SessionHolder,
    username: Option<&str>,
) -> OffertoryResult<User> {
    let username = username.ok_or_else(|| {
        OffertoryError::PermissionDenied(format!(
            "No user given; pass --user or set {}",
            USER_ENV
        ))
    })?;

    let password = read_password(&format!("Password for {}: ", username), PASSWORD_ENV)?;
    let outcome = AuthService::new(storage, session).login(username, &password)?;

    if outcome.must_change_password {
        eprintln!(
            "Warning: '{}' is using a temporary password. Change it with 'offertory passwd'.",
            outcome.user.username
        );
    }
    Ok(outcome.user)
}

/// Check credentials and report who is logged in
pub fn handle_login_command(
    storage: &Storage,
    session: &SessionHolder,
    username: Option<&str>,
) -> OffertoryResult<()> {
    let user = authenticate(storage, session, username)?;
    println!("Logged in as {} ({})", user.username, user.role);
    AuthService::new(storage, session).logout();
    Ok(())
}

/// Change the acting user's password
pub fn handle_passwd_command(
    storage: &Storage,
    session: &SessionHolder,
    username: Option<&str>,
) -> OffertoryResult<()> {
    let user = authenticate(storage, session, username)?;
    let current = read_password("Current password: ", PASSWORD_ENV)?;
    let new_password = read_new_password("New password: ")?;

    let auth = AuthService::new(storage, session);
    let updated = auth.change_password(user.id, &current, &new_password)?;
    println!("Password changed for {}", updated.username);
    auth.logout();
    Ok(())
}
