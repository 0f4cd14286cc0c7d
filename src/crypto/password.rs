//! Password digests and temporary passwords
//!
//! Permanent passwords are stored as a single unsalted SHA-256 digest in
//! lowercase hex. Temporary passwords issued by a reset are stored in clear
//! text until the user replaces them.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::User;

/// Lowercase hex SHA-256 of `password`
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check `password` against a user's credentials.
///
/// While a temporary password is in force it is the only accepted secret;
/// otherwise the digest of `password` must match the stored hash.
pub fn verify_password(user: &User, password: &str) -> bool {
    if user.is_temp {
        match &user.temp_password {
            Some(temp) => temp == password,
            None => false,
        }
    } else {
        hash_password(password) == user.password_hash
    }
}

/// A random one-time password such as `3f9a1c-07be42`
pub fn generate_temporary_password() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{}-{}", &raw[..6], &raw[6..12])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, UserId};
    use chrono::Utc;

    fn user(password_hash: &str, temp: Option<&str>) -> User {
        User {
            id: UserId::new(1),
            username: "usher".into(),
            email: None,
            password_hash: password_hash.into(),
            is_temp: temp.is_some(),
            temp_password: temp.map(String::from),
            role: Role::User,
            first_name: String::new(),
            last_name: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn test_permanent_password() {
        let user = user(&hash_password("s3cret"), None);
        assert!(verify_password(&user, "s3cret"));
        assert!(!verify_password(&user, "S3cret"));
        // The digest itself is not a password
        assert!(!verify_password(&user, &hash_password("s3cret")));
    }

    #[test]
    fn test_temporary_password_replaces_permanent() {
        let user = user(&hash_password("old"), Some("abc123-def456"));
        assert!(verify_password(&user, "abc123-def456"));
        assert!(!verify_password(&user, "old"));
    }

    #[test]
    fn test_temporary_password_shape() {
        let a = generate_temporary_password();
        let b = generate_temporary_password();
        assert_eq!(a.len(), 13);
        assert_eq!(a.as_bytes()[6], b'-');
        assert_ne!(a, b);
    }
}
