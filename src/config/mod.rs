//! Configuration module for Offertory
//!
//! This module provides configuration management including:
//! - Path resolution for the database, images and backups
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::OffertoryPaths;
pub use settings::{BackupRetention, Settings};
