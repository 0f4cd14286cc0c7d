//! Secure memory handling for sensitive data
//!
//! Passwords read from the terminal or environment are held in a
//! [`SecureString`] that zeros its buffer on drop.

use std::fmt;
use std::ops::Deref;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A password buffer wiped on drop and redacted when formatted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.inner
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString(<{} bytes>)", self.inner.len())
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_readable_through_deref() {
        let password = SecureString::new("hunter2");
        assert_eq!(password.as_str(), "hunter2");
        assert_eq!(&*password, "hunter2");
    }

    #[test]
    fn test_zeroize_clears_contents() {
        let mut password = SecureString::new("hunter2");
        password.zeroize();
        assert!(password.as_str().is_empty());
    }

    #[test]
    fn test_password_never_formatted() {
        let password = SecureString::new("hunter2");
        assert!(!format!("{:?}", password).contains("hunter2"));
        assert_eq!(password.to_string(), "[REDACTED]");
    }
}
