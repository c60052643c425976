//! Configuration validation.

use super::Config;
use crate::error::{MetaError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let fb = &config.firebird;
    if fb.host.trim().is_empty() {
        return Err(MetaError::Config("firebird.host is required".into()));
    }
    if fb.port == 0 {
        return Err(MetaError::Config("firebird.port must be non-zero".into()));
    }
    if fb.user.trim().is_empty() {
        return Err(MetaError::Config("firebird.user is required".into()));
    }

    let file_name = fb.database_file_name.trim();
    if file_name.is_empty() {
        return Err(MetaError::Config(
            "firebird.database_file_name is required".into(),
        ));
    }
    if file_name.contains(['/', '\\']) {
        return Err(MetaError::Config(format!(
            "firebird.database_file_name must be a bare file name, got '{}'",
            file_name
        )));
    }

    if config.execution.already_exists_codes.is_empty() {
        return Err(MetaError::Config(
            "execution.already_exists_codes must list at least one code".into(),
        ));
    }

    Ok(())
}
