//! Hub connection: transport seam, Socket.IO framing, and the manager that
//! owns the single socket.

mod manager;
pub mod memory;
pub mod socket_io;
mod types;
mod websocket;

pub use manager::{ConnectionManager, Emitter, Transport};
pub use memory::{MemoryHub, MemoryTransport};
pub use types::{ConnectionConfig, ConnectionStatus, TransportEvent};
pub use websocket::WsTransport;
