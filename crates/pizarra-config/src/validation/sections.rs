//! Validation for the hub, directory, and session sections.

use crate::schema::PizarraConfig;

use super::helpers::{validate_range, validate_url};

pub(crate) fn validate_hub(errors: &mut Vec<String>, config: &PizarraConfig) {
    let hub = &config.hub;
    validate_url(errors, "hub.url", &hub.url, &["http", "https", "ws", "wss"]);
    if !hub.socket_path.starts_with('/') {
        errors.push(format!(
            "hub.socket_path = {:?} must start with '/'",
            hub.socket_path
        ));
    }
    validate_range(
        errors,
        "hub.connect_timeout_secs",
        hub.connect_timeout_secs,
        1,
        120,
    );
    validate_range(
        errors,
        "hub.reconnect_delay_secs",
        hub.reconnect_delay_secs,
        1,
        60,
    );
    validate_range(
        errors,
        "hub.max_reconnect_delay_secs",
        hub.max_reconnect_delay_secs,
        hub.reconnect_delay_secs,
        600,
    );
}

pub(crate) fn validate_directory(errors: &mut Vec<String>, config: &PizarraConfig) {
    validate_url(
        errors,
        "directory.base_url",
        &config.directory.base_url,
        &["http", "https"],
    );
    validate_range(
        errors,
        "directory.timeout_secs",
        config.directory.timeout_secs,
        1,
        300,
    );
}

pub(crate) fn validate_session(errors: &mut Vec<String>, config: &PizarraConfig) {
    validate_range(
        errors,
        "session.event_capacity",
        u64::from(config.session.event_capacity),
        1,
        65536,
    );
}
