//! Capability traits at the database boundary.
//!
//! - [`CatalogReader`]: reads schema metadata for export
//! - [`StatementExecutor`]: runs one SQL statement as a non-query command
//! - [`ErrorClassifier`]: decides which statement errors are benign
//! - [`Connector`]: opens or creates a database connection
//!
//! The engine-specific catalog queries live behind these traits so the type
//! mapper, exporter and batch executor can be tested without a server.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::typemap::TypeDescriptor;

/// Direction of a procedure parameter (`RDB$PARAMETER_TYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamDirection {
    Input,
    Output,
}

impl ParamDirection {
    /// Catalog marker value: 0 for input, 1 for output.
    pub fn marker(&self) -> i32 {
        match self {
            ParamDirection::Input => 0,
            ParamDirection::Output => 1,
        }
    }
}

/// One column row of a table, as read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub name: String,
    pub domain_name: String,
    pub not_null: bool,
}

/// One parameter row of a procedure, as read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRow {
    pub name: String,
    pub domain_name: String,
}

/// Read schema metadata from a database catalog.
///
/// Every method runs to completion and returns owned rows, so cursors never
/// overlap on the underlying connection. Names are returned untrimmed; the
/// exporter trims catalog padding.
pub trait CatalogReader {
    /// All non-system domains with their type descriptors.
    fn list_domains(&mut self) -> Result<Vec<(String, TypeDescriptor)>>;

    /// Names of all non-system tables (views excluded).
    fn list_tables(&mut self) -> Result<Vec<String>>;

    /// Columns of a table ordered by position.
    fn list_columns(&mut self, table: &str) -> Result<Vec<ColumnRow>>;

    /// Names of all non-system procedures.
    fn list_procedures(&mut self) -> Result<Vec<String>>;

    /// Parameters of a procedure in one direction, ordered by number.
    fn list_params(&mut self, procedure: &str, direction: ParamDirection) -> Result<Vec<ParamRow>>;

    /// Source body of a procedure, empty when the catalog holds none.
    fn procedure_source(&mut self, procedure: &str) -> Result<String>;
}

/// Failure of a single statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementError {
    /// Driver error code, when the driver reported one.
    pub code: Option<i32>,
    pub message: String,
}

impl StatementError {
    pub fn new(code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for StatementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for StatementError {}

/// Execute SQL text against an open connection.
pub trait StatementExecutor {
    /// Run one statement as a non-query command.
    fn execute_statement(&mut self, sql: &str) -> std::result::Result<(), StatementError>;
}

/// Classify statement errors for the batch executor.
pub trait ErrorClassifier {
    /// Whether the error means the object being created already exists.
    fn is_already_exists(&self, err: &StatementError) -> bool;
}

/// A connection usable by every workflow.
pub trait Connection: CatalogReader + StatementExecutor {
    /// Close the connection, reporting driver errors.
    fn close(self) -> Result<()>;
}

/// Open or create databases.
pub trait Connector {
    type Conn: Connection;

    /// Open a connection to an existing database.
    fn connect(&self, connection_string: &str) -> Result<Self::Conn>;

    /// Create a new database file and return a connection to it.
    fn create_database(&self, path: &Path) -> Result<Self::Conn>;
}
