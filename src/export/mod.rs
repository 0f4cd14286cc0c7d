//! Export module for Offertory
//!
//! Provides data export in two formats:
//! - CSV: donations in the re-importable column layout
//! - SQL: a full dump of every table, used by the backup system

pub mod csv;
pub mod sql;

pub use csv::{export_donations_csv, write_donations_csv, EXPORT_DATE_FORMAT, EXPORT_HEADER};
pub use sql::{dump_sql, sql_literal, DumpStats};
