//! Authentication service
//!
//! Login accepts a username or email. Every failed attempt yields the same
//! [`OffertoryError::InvalidCredentials`] so a caller cannot tell an unknown
//! account from a wrong password.

use tracing::{info, warn};

use crate::crypto::{generate_temporary_password, hash_password, verify_password};
use crate::error::{OffertoryError, OffertoryResult};
use crate::models::{User, UserId};
use crate::session::SessionHolder;
use crate::storage::Storage;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    /// Set when the user logged in with a temporary password
    pub must_change_password: bool,
}

/// Service for login, logout and password management
pub struct AuthService<'a> {
    storage: &'a Storage,
    session: &'a SessionHolder,
}

impl<'a> AuthService<'a> {
    pub fn new(storage: &'a Storage, session: &'a SessionHolder) -> Self {
        Self { storage, session }
    }

    /// Find the account by username, then by email
    fn lookup(&self, identifier: &str) -> OffertoryResult<Option<User>> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Ok(None);
        }
        match self.storage.users.find_by_username(identifier)? {
            Some(user) => Ok(Some(user)),
            None => self.storage.users.find_by_email(identifier),
        }
    }

    /// Authenticate and make the user current
    pub fn login(&self, identifier: &str, password: &str) -> OffertoryResult<LoginOutcome> {
        let user = match self.lookup(identifier)? {
            Some(user) if verify_password(&user, password) => user,
            _ => {
                warn!("failed login attempt");
                return Err(OffertoryError::InvalidCredentials);
            }
        };

        info!(user = %user.id, "user logged in");
        let must_change_password = user.is_temp;
        self.session.login(user.clone());

        Ok(LoginOutcome {
            user,
            must_change_password,
        })
    }

    /// Clear the current user
    pub fn logout(&self) {
        if let Some(user) = self.session.current_user() {
            info!(user = %user.id, "user logged out");
        }
        self.session.logout();
    }

    /// Replace the password after checking the current one.
    ///
    /// Clears any temporary password; the session is refreshed when the
    /// user is the current one.
    pub fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> OffertoryResult<User> {
        let user = self
            .storage
            .users
            .get(user_id)?
            .ok_or_else(|| OffertoryError::user_not_found(user_id.to_string()))?;

        if !verify_password(&user, current_password) {
            warn!(user = %user.id, "password change rejected");
            return Err(OffertoryError::InvalidCredentials);
        }
        if new_password.is_empty() {
            return Err(OffertoryError::Validation("Password cannot be empty".into()));
        }

        let password_hash = hash_password(new_password);
        self.storage
            .users
            .set_credentials(user.id, &password_hash, false, None)?;
        info!(user = %user.id, "password changed");

        let updated = User {
            password_hash,
            is_temp: false,
            temp_password: None,
            ..user
        };
        if self
            .session
            .current_user()
            .is_some_and(|current| current.id == updated.id)
        {
            self.session.login(updated.clone());
        }
        Ok(updated)
    }

    /// Issue a temporary password for `user_id`. Admin only.
    ///
    /// The returned password is the only copy handed out; it is never
    /// logged.
    pub fn reset_password(&self, admin: &User, user_id: UserId) -> OffertoryResult<String> {
        if !admin.is_admin() {
            return Err(OffertoryError::PermissionDenied(
                "Only administrators can reset passwords".into(),
            ));
        }

        let user = self
            .storage
            .users
            .get(user_id)?
            .ok_or_else(|| OffertoryError::user_not_found(user_id.to_string()))?;

        let temp_password = generate_temporary_password();
        self.storage.users.set_credentials(
            user.id,
            &user.password_hash,
            true,
            Some(&temp_password),
        )?;
        info!(user = %user.id, admin = %admin.id, "temporary password issued");

        Ok(temp_password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Role};

    fn setup() -> (Storage, SessionHolder) {
        (Storage::open_in_memory().unwrap(), SessionHolder::new())
    }

    fn add_user(storage: &Storage, username: &str, password: &str, role: Role) -> User {
        storage
            .users
            .create(&NewUser {
                username: username.into(),
                email: Some(format!("{}@example.org", username)),
                password_hash: hash_password(password),
                role,
                ..NewUser::default()
            })
            .unwrap()
    }

    #[test]
    fn test_login_with_permanent_password() {
        let (storage, session) = setup();
        add_user(&storage, "usher", "pass123", Role::User);
        let auth = AuthService::new(&storage, &session);

        let outcome = auth.login("usher", "pass123").unwrap();
        assert!(!outcome.must_change_password);
        assert_eq!(session.current_user().unwrap().username, "usher");

        // Email works as identifier
        auth.logout();
        assert!(auth.login("usher@example.org", "pass123").is_ok());
    }

    #[test]
    fn test_failures_are_indistinguishable() {
        let (storage, session) = setup();
        add_user(&storage, "usher", "pass123", Role::User);
        let auth = AuthService::new(&storage, &session);

        let wrong_password = auth.login("usher", "nope").unwrap_err();
        let unknown_user = auth.login("ghost", "pass123").unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, OffertoryError::InvalidCredentials));
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_reset_then_change_password() {
        let (storage, session) = setup();
        let admin = add_user(&storage, "admin", "adminpw", Role::Admin);
        let usher = add_user(&storage, "usher", "old", Role::User);
        let auth = AuthService::new(&storage, &session);

        let temp = auth.reset_password(&admin, usher.id).unwrap();

        // The old password stops working while the temporary one is in force
        assert!(auth.login("usher", "old").is_err());
        let outcome = auth.login("usher", &temp).unwrap();
        assert!(outcome.must_change_password);

        auth.change_password(usher.id, &temp, "brand-new").unwrap();
        assert!(!session.current_user().unwrap().is_temp);
        assert!(auth.login("usher", &temp).is_err());
        assert!(auth.login("usher", "brand-new").is_ok());
    }

    #[test]
    fn test_reset_requires_admin() {
        let (storage, session) = setup();
        let usher = add_user(&storage, "usher", "pw", Role::User);
        let other = add_user(&storage, "other", "pw", Role::User);
        let auth = AuthService::new(&storage, &session);

        let err = auth.reset_password(&usher, other.id).unwrap_err();
        assert!(matches!(err, OffertoryError::PermissionDenied(_)));
    }

    #[test]
    fn test_change_password_checks_current() {
        let (storage, session) = setup();
        let usher = add_user(&storage, "usher", "pw", Role::User);
        let auth = AuthService::new(&storage, &session);

        assert!(auth.change_password(usher.id, "wrong", "new").is_err());
        assert!(auth.change_password(usher.id, "pw", "").is_err());
        assert!(auth.login("usher", "pw").is_ok());
    }
}
