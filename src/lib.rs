//! Offertory - church donation tracking
//!
//! This library provides the core functionality of the Offertory
//! application: checks received by a congregation are entered into dated
//! batches, attributed to donors and funds, and turned into deposit reports
//! and yearly giving statements.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (donors, funds, batches, donations, etc.)
//! - `storage`: SQLite storage layer with change notification
//! - `services`: Business logic layer
//! - `session`: The logged-in user
//! - `export`: CSV and SQL export
//! - `backup`: SQL backups and restore
//! - `reports`: Deposit reports and giving statements
//!
//! # Example
//!
//! ```rust,ignore
//! use offertory::config::{paths::OffertoryPaths, settings::Settings};
//! use offertory::storage::Storage;
//!
//! let paths = OffertoryPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(&paths)?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod session;
pub mod storage;

pub use error::{OffertoryError, OffertoryResult};
