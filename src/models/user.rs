//! User model
//!
//! Application users who enter batches. Admins manage other users and may
//! delete closed batches.

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::UserId;

/// Role of an application user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Stored representation ("ADMIN" / "USER")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }

    /// Parse a role from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Some(Self::Admin),
            "USER" => Some(Self::User),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Self::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown role '{}'", s).into()))
    }
}

/// An application user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,

    /// Lowercase hex SHA-256 of the permanent password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Set while a temporary password issued by a reset is in force
    pub is_temp: bool,

    /// Clear-text temporary password; only present while `is_temp` is set
    #[serde(skip_serializing)]
    pub temp_password: Option<String>,

    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// "First Last", or the username when no name is set
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Fields for creating a user
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub is_temp: bool,
    pub temp_password: Option<String>,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

impl NewUser {
    /// Validate the user fields
    pub fn validate(&self) -> Result<(), String> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err("Username cannot be empty".into());
        }
        if username.len() > 64 {
            return Err(format!("Username too long ({} chars, max 64)", username.len()));
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(format!("Invalid email address: {}", email));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("USER"), Some(Role::User));
        assert_eq!(Role::parse("owner"), None);
        assert_eq!(Role::Admin.to_string(), "ADMIN");
    }

    #[test]
    fn test_validation() {
        let mut new_user = NewUser {
            username: "treasurer".into(),
            ..NewUser::default()
        };
        assert!(new_user.validate().is_ok());

        new_user.email = Some("not-an-email".into());
        assert!(new_user.validate().is_err());

        new_user.email = None;
        new_user.username = "  ".into();
        assert!(new_user.validate().is_err());
    }

    #[test]
    fn test_secrets_not_serialized() {
        let user = User {
            id: UserId::new(1),
            username: "admin".into(),
            email: None,
            password_hash: "abc123".into(),
            is_temp: true,
            temp_password: Some("Temp-1234".into()),
            role: Role::Admin,
            first_name: String::new(),
            last_name: String::new(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("abc123"));
        assert!(!json.contains("Temp-1234"));
        assert_eq!(user.display_name(), "admin");
    }
}
