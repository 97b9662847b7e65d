//! Database dialect adapters, connection management, and schema
//! introspection for tablegen.
//!
//! Each supported engine implements [`DatabaseDriver`], which opens a
//! [`SchemaConnection`]: the uniform, dialect-agnostic capability surface
//! the rest of the pipeline works against. Downstream components never see
//! raw driver handles or dialect-specific metadata queries.

mod driver;
mod introspect;
mod manager;
mod mysql;
mod postgres;
mod registry;
mod sqlite;

pub use driver::{DatabaseDriver, SchemaConnection};
pub use introspect::{SchemaSnapshot, snapshot};
pub use manager::{connect, connect_with, test_connection, test_connection_with};
pub use mysql::MysqlDriver;
pub use postgres::PostgresDriver;
pub use registry::DriverRegistry;
pub use sqlite::SqliteDriver;
