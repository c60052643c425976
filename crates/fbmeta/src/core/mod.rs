//! Core abstractions shared by the export and apply paths.
//!
//! - [`schema`]: domain, table and procedure definitions with DDL rendering
//! - [`traits`]: capability traits at the database boundary

pub mod schema;
pub mod traits;

#[cfg(test)]
pub(crate) mod memory;

pub use schema::{
    ColumnDefinition, DomainDefinition, ParamDefinition, ProcedureDefinition, TableDefinition,
};
pub use traits::{
    CatalogReader, ColumnRow, Connection, Connector, ErrorClassifier, ParamDirection, ParamRow,
    StatementError, StatementExecutor,
};
