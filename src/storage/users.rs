//! User repository
//!
//! Rows of the `users` table. Lookups never fail on a missing row; they
//! return `None` and leave the decision to the service.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::error::OffertoryResult;
use crate::models::{NewUser, Role, User, UserId};

use super::changes::Table;
use super::database::Database;

const USER_COLUMNS: &str = "id, username, email, password_hash, is_temp, temp_password, \
                            role, first_name, last_name, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        is_temp: row.get(4)?,
        temp_password: row.get(5)?,
        role: row.get(6)?,
        first_name: row.get(7)?,
        last_name: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Repository for application users
#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a user and return the stored row
    pub fn create(&self, new_user: &NewUser) -> OffertoryResult<User> {
        let created_at = Utc::now();
        let id = self.db.write(Table::Users, |conn| {
            conn.execute(
                "INSERT INTO users (username, email, password_hash, is_temp, temp_password, \
                 role, first_name, last_name, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    new_user.username.trim(),
                    new_user.email,
                    new_user.password_hash,
                    new_user.is_temp,
                    new_user.temp_password,
                    new_user.role,
                    new_user.first_name,
                    new_user.last_name,
                    created_at,
                ],
            )?;
            Ok(UserId::new(conn.last_insert_rowid()))
        })?;

        Ok(User {
            id,
            username: new_user.username.trim().to_string(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            is_temp: new_user.is_temp,
            temp_password: new_user.temp_password.clone(),
            role: new_user.role,
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            created_at,
        })
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> OffertoryResult<Option<User>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                    params![id],
                    user_from_row,
                )
                .optional()?)
        })
    }

    /// Get a user by exact username
    pub fn find_by_username(&self, username: &str) -> OffertoryResult<Option<User>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
                    params![username],
                    user_from_row,
                )
                .optional()?)
        })
    }

    /// Get a user by exact email
    pub fn find_by_email(&self, email: &str) -> OffertoryResult<Option<User>> {
        self.db.read(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                    params![email],
                    user_from_row,
                )
                .optional()?)
        })
    }

    /// All users ordered by username
    pub fn list(&self) -> OffertoryResult<Vec<User>> {
        self.db.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM users ORDER BY username",
                USER_COLUMNS
            ))?;
            let users = stmt
                .query_map([], user_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(users)
        })
    }

    pub fn count(&self) -> OffertoryResult<i64> {
        self.db
            .read(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
    }

    /// Persist profile fields and role
    pub fn update(&self, user: &User) -> OffertoryResult<()> {
        self.db.write(Table::Users, |conn| {
            conn.execute(
                "UPDATE users SET username = ?1, email = ?2, role = ?3, first_name = ?4, \
                 last_name = ?5 WHERE id = ?6",
                params![
                    user.username,
                    user.email,
                    user.role,
                    user.first_name,
                    user.last_name,
                    user.id,
                ],
            )?;
            Ok(())
        })
    }

    /// Replace the credentials of a user
    pub fn set_credentials(
        &self,
        id: UserId,
        password_hash: &str,
        is_temp: bool,
        temp_password: Option<&str>,
    ) -> OffertoryResult<()> {
        self.db.write(Table::Users, |conn| {
            conn.execute(
                "UPDATE users SET password_hash = ?1, is_temp = ?2, temp_password = ?3 \
                 WHERE id = ?4",
                params![password_hash, is_temp, temp_password, id],
            )?;
            Ok(())
        })
    }

    /// Number of administrators
    pub fn count_with_role(&self, role: Role) -> OffertoryResult<i64> {
        self.db.read(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM users WHERE role = ?1",
                params![role],
                |r| r.get(0),
            )?)
        })
    }

    /// Delete a user; returns whether a row was removed
    pub fn delete(&self, id: UserId) -> OffertoryResult<bool> {
        self.db.write(Table::Users, |conn| {
            Ok(conn.execute("DELETE FROM users WHERE id = ?1", params![id])? > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> UserRepository {
        UserRepository::new(Database::open_in_memory().unwrap())
    }

    fn new_user(username: &str, email: Option<&str>) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.map(String::from),
            password_hash: "hash".into(),
            ..NewUser::default()
        }
    }

    #[test]
    fn test_create_and_lookup() {
        let repo = repo();
        let user = repo
            .create(&new_user("treasurer", Some("t@example.org")))
            .unwrap();

        assert_eq!(repo.get(user.id).unwrap().unwrap().username, "treasurer");
        assert_eq!(
            repo.find_by_username("treasurer").unwrap().unwrap().id,
            user.id
        );
        assert_eq!(
            repo.find_by_email("t@example.org").unwrap().unwrap().id,
            user.id
        );
        assert!(repo.find_by_username("nobody").unwrap().is_none());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_username_unique() {
        let repo = repo();
        repo.create(&new_user("usher", None)).unwrap();
        assert!(repo.create(&new_user("usher", None)).is_err());
    }

    #[test]
    fn test_set_credentials_and_delete() {
        let repo = repo();
        let user = repo.create(&new_user("usher", None)).unwrap();

        repo.set_credentials(user.id, "newhash", true, Some("tmp"))
            .unwrap();
        let stored = repo.get(user.id).unwrap().unwrap();
        assert_eq!(stored.password_hash, "newhash");
        assert!(stored.is_temp);
        assert_eq!(stored.temp_password.as_deref(), Some("tmp"));

        assert!(repo.delete(user.id).unwrap());
        assert!(!repo.delete(user.id).unwrap());
    }
}
