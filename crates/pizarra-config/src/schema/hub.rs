//! Hub connection configuration.

use serde::{Deserialize, Serialize};

/// Where the real-time hub lives and how to keep the socket alive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Base URL of the hub (http/https/ws/wss).
    pub url: String,
    /// Socket.IO endpoint path on the hub.
    pub socket_path: String,
    /// Seconds to wait for the WebSocket handshake (valid range: 1-120).
    pub connect_timeout_secs: u64,
    /// Reconnect base delay in seconds.
    pub reconnect_delay_secs: u64,
    /// Maximum reconnect delay in seconds.
    pub max_reconnect_delay_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".into(),
            socket_path: "/socket.io/".into(),
            connect_timeout_secs: 15,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 30,
        }
    }
}
