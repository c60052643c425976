//! Error types for the schema tool.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for usage and configuration errors.
pub const EXIT_USAGE_ERROR: u8 = 1;
/// Exit code for connection, create and catalog query failures.
pub const EXIT_DATABASE_ERROR: u8 = 2;
/// Exit code for a strict run in which statements failed.
pub const EXIT_STATEMENTS_FAILED: u8 = 3;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for workflow operations.
#[derive(Error, Debug)]
pub enum MetaError {
    /// Missing or invalid argument.
    #[error("Usage error: {0}")]
    Usage(String),

    /// Configuration error (invalid YAML, bad values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The scripts directory does not exist.
    #[error("Scripts directory not found: {}", .0.display())]
    ScriptsDirMissing(PathBuf),

    /// Build refused because the database file is already there.
    #[error("Database file already exists: {}", .0.display())]
    DatabaseExists(PathBuf),

    /// Could not open or create a database.
    #[error("Connection failed: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// Driver error outside of per-statement execution.
    #[error("Database error: {0}")]
    Database(String),

    /// Catalog query failed during export.
    #[error("Catalog query failed for {object}: {message}")]
    Catalog { object: String, message: String },

    /// Strict run finished with failed statements.
    #[error("{failed} statement(s) failed")]
    StatementsFailed { failed: usize },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rsfbclient::FbError> for MetaError {
    fn from(err: rsfbclient::FbError) -> Self {
        MetaError::Database(err.to_string())
    }
}

impl MetaError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl Into<String>, context: impl Into<String>) -> Self {
        MetaError::Connection {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Create a Catalog error
    pub fn catalog(object: impl Into<String>, message: impl Into<String>) -> Self {
        MetaError::Catalog {
            object: object.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MetaError::Usage(_)
            | MetaError::Config(_)
            | MetaError::ScriptsDirMissing(_)
            | MetaError::DatabaseExists(_)
            | MetaError::Yaml(_) => EXIT_USAGE_ERROR,
            MetaError::Connection { .. } | MetaError::Database(_) | MetaError::Catalog { .. } => {
                EXIT_DATABASE_ERROR
            }
            MetaError::StatementsFailed { .. } => EXIT_STATEMENTS_FAILED,
            MetaError::Io(_) | MetaError::Json(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for workflow operations.
pub type Result<T> = std::result::Result<T, MetaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_map_to_code_1() {
        assert_eq!(MetaError::Usage("x".into()).exit_code(), 1);
        assert_eq!(
            MetaError::DatabaseExists(PathBuf::from("db/new_database.fdb")).exit_code(),
            1
        );
        assert_eq!(
            MetaError::ScriptsDirMissing(PathBuf::from("scripts")).exit_code(),
            1
        );
    }

    #[test]
    fn test_runtime_errors_are_nonzero() {
        assert_eq!(MetaError::connection("refused", "open").exit_code(), 2);
        assert_eq!(MetaError::StatementsFailed { failed: 2 }.exit_code(), 3);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(MetaError::from(io).exit_code(), 7);
    }

    #[test]
    fn test_format_detailed_includes_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let detailed = MetaError::from(io).format_detailed();
        assert!(detailed.starts_with("Error: IO error: denied"));
    }
}
