//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::drivers::firebird::{ISC_NO_META_UPDATE, SQLCODE_NO_META_UPDATE};

/// Root configuration structure.
///
/// Every section is optional; a missing config file means all defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings used when creating a new database.
    #[serde(default)]
    pub firebird: FirebirdConfig,

    /// Statement execution behavior.
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Firebird server settings for `build-db`.
#[derive(Clone, Serialize, Deserialize)]
pub struct FirebirdConfig {
    /// Server host (default: "localhost").
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 3050).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username (default: "SYSDBA").
    #[serde(default = "default_user")]
    pub user: String,

    /// Password (default: "masterkey").
    #[serde(default = "default_password")]
    pub password: String,

    /// Connection character set (default: "UTF8").
    #[serde(default = "default_charset")]
    pub charset: String,

    /// File name of the database created inside `--db-dir`.
    #[serde(default = "default_database_file_name")]
    pub database_file_name: String,
}

impl Default for FirebirdConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: default_password(),
            charset: default_charset(),
            database_file_name: default_database_file_name(),
        }
    }
}

impl fmt::Debug for FirebirdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebirdConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("charset", &self.charset)
            .field("database_file_name", &self.database_file_name)
            .finish()
    }
}

/// Statement execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Driver error codes that mean "object already exists".
    /// Statements failing with one of these are skipped silently.
    #[serde(default = "default_already_exists_codes")]
    pub already_exists_codes: Vec<i32>,

    /// Fail the run when any statement failed (default: false).
    #[serde(default)]
    pub fail_on_statement_errors: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            already_exists_codes: default_already_exists_codes(),
            fail_on_statement_errors: false,
        }
    }
}

// Default value functions for serde
fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3050
}

fn default_user() -> String {
    "SYSDBA".to_string()
}

fn default_password() -> String {
    "masterkey".to_string()
}

fn default_charset() -> String {
    "UTF8".to_string()
}

fn default_database_file_name() -> String {
    "new_database.fdb".to_string()
}

fn default_already_exists_codes() -> Vec<i32> {
    vec![ISC_NO_META_UPDATE, SQLCODE_NO_META_UPDATE]
}
