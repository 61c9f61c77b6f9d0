//! Where the config file lives, and seeding it on first run.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use pizarra_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

/// Environment variable that overrides the default config location.
pub const CONFIG_PATH_ENV: &str = "PIZARRA_CONFIG";

/// `$PIZARRA_CONFIG` if set, else `<platform config dir>/pizarra/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join("pizarra").join("config.toml"))
        .ok_or_else(|| {
            ConfigError::ParseError(format!(
                "no platform config directory; set {CONFIG_PATH_ENV}"
            ))
        })
}

/// Write the commented template to `path` unless something is already there.
///
/// Returns whether a file was written. An existing file is never touched.
pub fn create_default_config(path: &Path) -> Result<bool, ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| io_failure("create", dir, e))?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(io_failure("create", path, e)),
    };
    file.write_all(default_config_toml().as_bytes())
        .map_err(|e| io_failure("write", path, e))?;

    info!(path = %path.display(), "Wrote default config");
    Ok(true)
}

pub(super) fn io_failure(action: &str, path: &Path, e: std::io::Error) -> ConfigError {
    ConfigError::ParseError(format!("failed to {action} {}: {e}", path.display()))
}
