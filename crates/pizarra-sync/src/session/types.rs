//! Session options and the change notifications observers receive.

use crate::connection::ConnectionStatus;
use crate::document::Document;
use crate::protocol::{EditorClaim, GeneratedCode, User};

/// Tunables for a [`RoomSession`](super::RoomSession).
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Close the hub connection on `leave`, not just on `cleanup`.
    pub disconnect_on_leave: bool,
    /// Buffered [`SessionUpdate`]s per subscriber before it starts lagging.
    pub event_capacity: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            disconnect_on_leave: true,
            event_capacity: 256,
        }
    }
}

/// Published whenever an observable part of the session changes.
///
/// Each variant carries the new value, so observers never need to read
/// back into the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Connection(ConnectionStatus),
    DocumentChanged(Document),
    /// Present users, sorted by id.
    PresenceChanged(Vec<User>),
    EditorChanged(Option<EditorClaim>),
    CodeGenerated(GeneratedCode),
    /// The hub refused a request; local state is kept as it was.
    Rejected(String),
    /// A connection attempt failed; the transport keeps retrying.
    TransportError(String),
}
