//! Tests for the full validation pipeline.

use super::*;
use crate::schema::*;

#[test]
fn default_config_validates() {
    let config = PizarraConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_bad_hub_url() {
    let mut config = PizarraConfig::default();
    config.hub.url = "localhost:3000".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("hub.url"));
}

#[test]
fn accepts_websocket_hub_url() {
    let mut config = PizarraConfig::default();
    config.hub.url = "wss://hub.example.com".into();
    assert!(validate(&config).is_ok());
}

#[test]
fn directory_rejects_websocket_scheme() {
    let mut config = PizarraConfig::default();
    config.directory.base_url = "ws://localhost:3000/api".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("directory.base_url"));
}

#[test]
fn catches_relative_socket_path() {
    let mut config = PizarraConfig::default();
    config.hub.socket_path = "socket.io/".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("hub.socket_path"));
}

#[test]
fn max_reconnect_delay_must_cover_base_delay() {
    let mut config = PizarraConfig::default();
    config.hub.reconnect_delay_secs = 10;
    config.hub.max_reconnect_delay_secs = 5;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("hub.max_reconnect_delay_secs"));
}

#[test]
fn catches_zero_event_capacity() {
    let mut config = PizarraConfig::default();
    config.session.event_capacity = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("session.event_capacity"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = PizarraConfig::default();
    config.hub.connect_timeout_secs = 0;
    config.directory.timeout_secs = 1000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("hub.connect_timeout_secs"));
    assert!(err.contains("directory.timeout_secs"));
    assert!(err.contains("; "));
}
