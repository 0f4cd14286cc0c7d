//! Logged-in user state
//!
//! The current user is published through a `tokio::sync::watch` channel so
//! front ends can react to login and logout without polling.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{OffertoryError, OffertoryResult};
use crate::models::User;

/// Holds the current user for the lifetime of the process
#[derive(Debug, Clone)]
pub struct SessionHolder {
    sender: Arc<watch::Sender<Option<User>>>,
}

impl SessionHolder {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Replace the current user
    pub fn login(&self, user: User) {
        self.sender.send_replace(Some(user));
    }

    /// Clear the current user
    pub fn logout(&self) {
        self.sender.send_replace(None);
    }

    /// Snapshot of the current user
    pub fn current_user(&self) -> Option<User> {
        self.sender.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// Observe every subsequent login and logout
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.sender.subscribe()
    }

    /// The current user, or `PermissionDenied` when nobody is logged in
    pub fn require_user(&self) -> OffertoryResult<User> {
        self.current_user()
            .ok_or_else(|| OffertoryError::PermissionDenied("Not logged in".into()))
    }

    /// The current user if they are an administrator
    pub fn require_admin(&self) -> OffertoryResult<User> {
        let user = self.require_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(OffertoryError::PermissionDenied(format!(
                "{} is not an administrator",
                user.username
            )))
        }
    }
}

impl Default for SessionHolder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, UserId};
    use chrono::Utc;

    fn user(role: Role) -> User {
        User {
            id: UserId::new(3),
            username: "usher".into(),
            email: None,
            password_hash: String::new(),
            is_temp: false,
            temp_password: None,
            role,
            first_name: String::new(),
            last_name: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_login_logout() {
        let session = SessionHolder::new();
        assert!(session.require_user().is_err());

        session.login(user(Role::User));
        assert!(session.is_logged_in());
        assert_eq!(session.require_user().unwrap().username, "usher");
        assert!(session.require_admin().is_err());

        session.logout();
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_subscriber_sees_changes() {
        let session = SessionHolder::new();
        let mut rx = session.subscribe();
        assert!(!rx.has_changed().unwrap());

        session.login(user(Role::Admin));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().as_ref().unwrap().is_admin());

        session.logout();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());
    }
}
