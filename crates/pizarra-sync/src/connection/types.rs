//! Configuration and event types for the hub connection.

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How to reach the hub and how hard to retry.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Base URL of the hub (http/https/ws/wss).
    pub url: String,
    /// Socket.IO endpoint path.
    pub socket_path: String,
    /// Seconds to wait for the WebSocket handshake.
    pub connect_timeout_secs: u64,
    /// Reconnect base delay in seconds.
    pub reconnect_delay_secs: u64,
    /// Maximum reconnect delay in seconds.
    pub max_reconnect_delay_secs: u64,
}

impl Default for ConnectionConfig {
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

impl ConnectionConfig {
    /// WebSocket URL for the Socket.IO (Engine.IO v4) endpoint.
    pub(crate) fn ws_url(&self) -> String {
        let base = self.url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        let path = if self.socket_path.ends_with('/') {
            self.socket_path.clone()
        } else {
            format!("{}/", self.socket_path)
        };
        format!("{base}{path}?EIO=4&transport=websocket")
    }

    /// Next backoff delay after `current`, capped at the configured maximum.
    pub(crate) fn next_delay(&self, current: u64) -> u64 {
        current
            .saturating_mul(2)
            .clamp(1, self.max_reconnect_delay_secs.max(1))
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Everything the transport reports upward.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The hub accepted our socket; emits will now be delivered.
    Connected,
    /// The socket dropped; the transport is retrying in the background.
    Disconnected,
    /// A named event from the hub.
    Message {
        event: String,
        payload: serde_json::Value,
    },
    /// Connection attempt failed or the hub refused the socket.
    Error(String),
}

/// Coarse connection state for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> ConnectionConfig {
        ConnectionConfig {
            url: url.into(),
            ..Default::default()
        }
    }

    #[test]
    fn ws_url_maps_http_schemes() {
        assert_eq!(
            config("http://localhost:3000").ws_url(),
            "ws://localhost:3000/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            config("https://hub.example.com/").ws_url(),
            "wss://hub.example.com/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn ws_url_keeps_websocket_schemes_and_custom_path() {
        let cfg = ConnectionConfig {
            url: "wss://hub.example.com".into(),
            socket_path: "/rt".into(),
            ..Default::default()
        };
        assert_eq!(
            cfg.ws_url(),
            "wss://hub.example.com/rt/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let cfg = ConnectionConfig {
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 5,
            ..Default::default()
        };
        assert_eq!(cfg.next_delay(1), 2);
        assert_eq!(cfg.next_delay(2), 4);
        assert_eq!(cfg.next_delay(4), 5);
        assert_eq!(cfg.next_delay(5), 5);
    }
}
