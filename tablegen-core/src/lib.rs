//! Core types for the tablegen service generator.
//!
//! This crate provides the data model shared across the tablegen
//! ecosystem: connection configuration, the error taxonomy, schema
//! metadata shapes, and per-table generation options.

mod config;
mod connection;
mod error;
mod options;
mod schema;
mod utils;

// Connection configuration
pub use config::{DbConfig, Dialect};
// Connection test outcome
pub use connection::ConnectionResult;
// Error taxonomy
pub use error::{DbError, ErrorCode, Result};
// Per-table generation options
pub use options::{TableOption, default_service_name};
// Schema metadata
pub use schema::{ColumnInfo, TableInfo, TableKind};
// String utilities
pub use utils::{to_pascal_case, to_snake_case};
