//! User service
//!
//! Account management. Creating, promoting and deleting users is reserved
//! to administrators.

use tracing::info;

use crate::crypto::hash_password;
use crate::error::{OffertoryError, OffertoryResult};
use crate::models::{NewUser, Role, User, UserId};
use crate::storage::Storage;

/// Input for creating a new user
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

/// Profile fields a user may edit
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears the email
    pub email: Option<Option<String>>,
}

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
}

fn require_admin(acting: &User, action: &str) -> OffertoryResult<()> {
    if acting.is_admin() {
        Ok(())
    } else {
        Err(OffertoryError::PermissionDenied(format!(
            "Only administrators can {}",
            action
        )))
    }
}

impl<'a> UserService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a user. Admin only.
    pub fn create(&self, acting: &User, input: CreateUserInput) -> OffertoryResult<User> {
        require_admin(acting, "create users")?;

        if input.password.is_empty() {
            return Err(OffertoryError::Validation("Password cannot be empty".into()));
        }

        let email = input
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        let new_user = NewUser {
            username: input.username.trim().to_string(),
            email,
            password_hash: hash_password(&input.password),
            is_temp: false,
            temp_password: None,
            role: input.role,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
        };
        new_user.validate().map_err(OffertoryError::Validation)?;

        if self
            .storage
            .users
            .find_by_username(&new_user.username)?
            .is_some()
        {
            return Err(OffertoryError::Duplicate {
                entity_type: "User",
                identifier: new_user.username,
            });
        }
        if let Some(email) = &new_user.email {
            if self.storage.users.find_by_email(email)?.is_some() {
                return Err(OffertoryError::Duplicate {
                    entity_type: "User",
                    identifier: email.clone(),
                });
            }
        }

        let user = self.storage.users.create(&new_user)?;
        info!(user = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub fn get(&self, id: UserId) -> OffertoryResult<User> {
        self.storage
            .users
            .get(id)?
            .ok_or_else(|| OffertoryError::user_not_found(id.to_string()))
    }

    /// Find by username or `usr-` id
    pub fn find(&self, identifier: &str) -> OffertoryResult<User> {
        if let Some(user) = self.storage.users.find_by_username(identifier.trim())? {
            return Ok(user);
        }
        if let Ok(id) = identifier.parse::<UserId>() {
            if let Some(user) = self.storage.users.get(id)? {
                return Ok(user);
            }
        }
        Err(OffertoryError::user_not_found(identifier))
    }

    pub fn list(&self) -> OffertoryResult<Vec<User>> {
        self.storage.users.list()
    }

    /// Edit names and email. Users may edit themselves; admins anyone.
    pub fn update_profile(
        &self,
        acting: &User,
        id: UserId,
        input: UpdateProfileInput,
    ) -> OffertoryResult<User> {
        if acting.id != id {
            require_admin(acting, "edit other users")?;
        }
        let mut user = self.get(id)?;

        if let Some(first_name) = input.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = input.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(email) = input.email {
            let email = email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
            if let Some(address) = &email {
                if !address.contains('@') {
                    return Err(OffertoryError::Validation(format!(
                        "Invalid email address: {}",
                        address
                    )));
                }
                if let Some(other) = self.storage.users.find_by_email(address)? {
                    if other.id != user.id {
                        return Err(OffertoryError::Duplicate {
                            entity_type: "User",
                            identifier: address.clone(),
                        });
                    }
                }
            }
            user.email = email;
        }

        self.storage.users.update(&user)?;
        Ok(user)
    }

    /// Change a user's role. Admin only; the last admin cannot be demoted.
    pub fn set_role(&self, acting: &User, id: UserId, role: Role) -> OffertoryResult<User> {
        require_admin(acting, "change roles")?;
        let mut user = self.get(id)?;

        if user.role == Role::Admin
            && role != Role::Admin
            && self.storage.users.count_with_role(Role::Admin)? <= 1
        {
            return Err(OffertoryError::Validation(
                "Cannot demote the last administrator".into(),
            ));
        }

        user.role = role;
        self.storage.users.update(&user)?;
        info!(user = %user.id, role = %role, "role changed");
        Ok(user)
    }

    /// Delete a user. Admin only; admins cannot delete themselves and users
    /// who created batches are kept for the batch history.
    pub fn delete(&self, acting: &User, id: UserId) -> OffertoryResult<User> {
        require_admin(acting, "delete users")?;
        if acting.id == id {
            return Err(OffertoryError::Validation(
                "You cannot delete your own account".into(),
            ));
        }

        let user = self.get(id)?;
        let batches = self.storage.batches.count_created_by(id)?;
        if batches > 0 {
            return Err(OffertoryError::Validation(format!(
                "User '{}' created {} batch(es) and cannot be deleted",
                user.username, batches
            )));
        }

        self.storage.users.delete(id)?;
        info!(user = %id, "user deleted");
        Ok(user)
    }
}
