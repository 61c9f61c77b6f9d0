//! Socket.IO v5 over Engine.IO v4, text frames only.
//!
//! Frame layout: one Engine.IO type digit, then for `4` (message) one
//! Socket.IO type digit, then an optional `/namespace,`, an optional ack
//! id, and a JSON body. Only the default namespace is used.

use serde::Deserialize;

use pizarra_common::SyncError;

/// Engine.IO open handshake.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
}

fn default_ping_interval() -> u64 {
    25_000
}

fn default_ping_timeout() -> u64 {
    20_000
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping(String),
    Pong,
    Noop,
    /// Socket.IO namespace connect acknowledgement.
    Connect,
    Disconnect,
    Event {
        name: String,
        payload: serde_json::Value,
    },
    ConnectError(String),
}

/// Frame that asks the server to attach us to the default namespace.
pub const CONNECT: &str = "40";
/// Frame that detaches from the default namespace.
pub const DISCONNECT: &str = "41";

pub fn encode_pong(data: &str) -> String {
    format!("3{data}")
}

/// `42["name",payload]`
pub fn encode_event(name: &str, payload: &serde_json::Value) -> String {
    format!("42{}", serde_json::json!([name, payload]))
}

pub fn decode(frame: &str) -> Result<Packet, SyncError> {
    let mut chars = frame.chars();
    let engine_type = chars
        .next()
        .ok_or_else(|| SyncError::Protocol("empty frame".into()))?;
    let rest = chars.as_str();

    match engine_type {
        '0' => serde_json::from_str(rest)
            .map(Packet::Open)
            .map_err(|e| SyncError::Protocol(format!("bad open handshake: {e}"))),
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping(rest.to_string())),
        '3' => Ok(Packet::Pong),
        '4' => decode_socket_packet(rest),
        '6' => Ok(Packet::Noop),
        other => Err(SyncError::Protocol(format!(
            "unsupported engine packet type {other:?}"
        ))),
    }
}

fn decode_socket_packet(body: &str) -> Result<Packet, SyncError> {
    let mut chars = body.chars();
    let socket_type = chars
        .next()
        .ok_or_else(|| SyncError::Protocol("empty socket packet".into()))?;
    let data = skip_namespace(chars.as_str());

    match socket_type {
        '0' => Ok(Packet::Connect),
        '1' => Ok(Packet::Disconnect),
        '2' => decode_event(data.trim_start_matches(|c: char| c.is_ascii_digit())),
        '4' => {
            let value: serde_json::Value = serde_json::from_str(data).unwrap_or_default();
            let message = value
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| value.as_str())
                .unwrap_or("connection refused")
                .to_string();
            Ok(Packet::ConnectError(message))
        }
        other => Err(SyncError::Protocol(format!(
            "unsupported socket packet type {other:?}"
        ))),
    }
}

/// Drop a leading `/namespace,` if present.
fn skip_namespace(data: &str) -> &str {
    if data.starts_with('/') {
        data.split_once(',').map(|(_, rest)| rest).unwrap_or("")
    } else {
        data
    }
}

fn decode_event(data: &str) -> Result<Packet, SyncError> {
    let args: Vec<serde_json::Value> = serde_json::from_str(data)
        .map_err(|e| SyncError::Protocol(format!("bad event body: {e}")))?;
    let mut args = args.into_iter();
    let name = match args.next() {
        Some(serde_json::Value::String(name)) => name,
        _ => return Err(SyncError::Protocol("event without a name".into())),
    };
    Ok(Packet::Event {
        name,
        payload: args.next().unwrap_or(serde_json::Value::Null),
    })
}
