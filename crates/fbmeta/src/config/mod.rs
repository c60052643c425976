//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::Path;

/// Escaped in the user, password and charset parts of a connection URL.
const COMPONENT: &AsciiSet = &PATH_SEGMENT.add(b'/').add(b':').add(b';').add(b'=').add(b'@');

/// Escaped in the database path; `/` stays a separator.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl FirebirdConfig {
    /// Connection URL for a database file on the configured server.
    ///
    /// User, password, path and charset are percent-encoded; the driver
    /// decodes them again when parsing the URL.
    pub fn database_url(&self, path: &Path) -> String {
        format!(
            "firebird://{}:{}@{}:{}/{}?charset={}",
            utf8_percent_encode(&self.user, COMPONENT),
            utf8_percent_encode(&self.password, COMPONENT),
            self.host,
            self.port,
            utf8_percent_encode(&path.to_string_lossy(), PATH_SEGMENT),
            utf8_percent_encode(&self.charset, COMPONENT)
        )
    }
}
