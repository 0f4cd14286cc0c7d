//! Credential handling for Offertory
//!
//! SHA-256 password digests, temporary password generation and a string type
//! that wipes secrets from memory when dropped.

pub mod password;
pub mod secure_memory;

pub use password::{generate_temporary_password, hash_password, verify_password};
pub use secure_memory::SecureString;
