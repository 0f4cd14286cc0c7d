//! Custom error types for Offertory
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Every repository, service and use case
//! returns [`OffertoryResult`]; the CLI surfaces the message verbatim.

use thiserror::Error;

/// The main error type for Offertory operations
#[derive(Error, Debug)]
pub enum OffertoryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// SQLite errors
    #[error("Database error: {0}")]
    Database(String),

    /// CSV reader/writer errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Backup and restore errors
    #[error("Backup error: {0}")]
    Backup(String),

    /// Login failed. Carries no detail on purpose.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The acting user may not perform the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Batch is closed
    #[error("Batch is locked: {0}")]
    Locked(String),
}

impl OffertoryError {
    /// Create a "not found" error for users
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "User",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for donors
    pub fn donor_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Donor",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for funds
    pub fn fund_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Fund",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for batches
    pub fn batch_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Batch",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for donations
    pub fn donation_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Donation",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for OffertoryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for OffertoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<rusqlite::Error> for OffertoryError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<csv::Error> for OffertoryError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for Offertory operations
pub type OffertoryResult<T> = Result<T, OffertoryError>;
