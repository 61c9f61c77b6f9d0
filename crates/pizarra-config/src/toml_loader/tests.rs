//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_pizarra_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, pizarra_common::ConfigError::FileNotFound(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[hub]
url = "wss://hub.example.com"
reconnect_delay_secs = 2

[session]
disconnect_on_leave = false
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.hub.url, "wss://hub.example.com");
    assert_eq!(config.hub.reconnect_delay_secs, 2);
    assert!(!config.session.disconnect_on_leave);
    // Defaults preserved
    assert_eq!(config.hub.max_reconnect_delay_secs, 30);
    assert_eq!(config.directory.timeout_secs, 30);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, pizarra_common::ConfigError::ParseError(_)));
}

#[test]
fn invalid_values_are_returned_as_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[hub]
connect_timeout_secs = 0
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.hub.connect_timeout_secs, 0);
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pizarra").join("config.toml");

    assert!(create_default_config(&path).unwrap());
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.hub.url, "http://localhost:3000");
    assert_eq!(config.directory.base_url, "http://localhost:3000/api");
}

#[test]
fn default_config_toml_is_valid() {
    use super::template::default_config_toml;
    use crate::schema::PizarraConfig;

    let config: PizarraConfig = toml::from_str(&default_config_toml()).unwrap();
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn default_config_path_is_reasonable() {
    if std::env::var_os(CONFIG_PATH_ENV).is_some() {
        return;
    }
    // May not resolve in every CI environment.
    if let Ok(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("pizarra"));
        assert!(path_str.ends_with("config.toml"));
    }
}

#[test]
fn seeding_never_overwrites_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[hub]\nurl = \"wss://mine.example.com\"\n").unwrap();

    assert!(!create_default_config(&path).unwrap());
    let config = load_from_path(&path).unwrap();
    assert_eq!(config.hub.url, "wss://mine.example.com");
}

#[test]
fn parse_error_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[hub\n").unwrap();

    let err = load_from_path(&path).unwrap_err().to_string();
    assert!(err.contains("broken.toml"), "{err}");
}

#[test]
fn parse_toml_fills_defaults() {
    let config = parse_toml("[session]\nevent_capacity = 8\n").unwrap();
    assert_eq!(config.session.event_capacity, 8);
    assert_eq!(config.hub.url, "http://localhost:3000");
    assert!(parse_toml("[session]\nevent_capacity = \"many\"\n").is_err());
}
