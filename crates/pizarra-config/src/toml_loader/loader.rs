//! Reading and parsing the TOML file.

use std::io::ErrorKind;
use std::path::Path;

use pizarra_common::ConfigError;
use tracing::{debug, warn};

use super::paths::{create_default_config, default_config_path, io_failure};
use crate::schema::PizarraConfig;
use crate::validation;

/// Parse config text. Absent keys take their defaults.
pub fn parse_toml(content: &str) -> Result<PizarraConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load the file at `path`.
///
/// Out-of-range values only produce a warning here; callers that must not
/// run with them validate again (see [`crate::load_config_from`]).
pub fn load_from_path(path: &Path) -> Result<PizarraConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(io_failure("read", path, e)),
    };

    let config = parse_toml(&content).map_err(|e| match e {
        ConfigError::ParseError(msg) => {
            ConfigError::ParseError(format!("{}: {msg}", path.display()))
        }
        other => other,
    })?;

    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), error = %e, "Config has invalid values");
    }
    debug!(path = %path.display(), "Config loaded");
    Ok(config)
}

/// Load from [`default_config_path`], seeding the template on first run.
pub fn load_default() -> Result<PizarraConfig, ConfigError> {
    let path = default_config_path()?;
    if create_default_config(&path)? {
        debug!(path = %path.display(), "No config found, seeded template");
    }
    load_from_path(&path)
}
