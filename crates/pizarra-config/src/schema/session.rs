use serde::{Deserialize, Serialize};

/// Room session behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Close the hub connection when leaving a room.
    pub disconnect_on_leave: bool,
    /// Buffered state-change notifications per subscriber.
    pub event_capacity: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            disconnect_on_leave: true,
            event_capacity: 256,
        }
    }
}
