//! Client-side real-time synchronization for shared whiteboards.
//!
//! A [`RoomSession`] joins one room at a time over a single hub
//! connection, keeps the room's document, presence set, and editor claim,
//! and publishes a [`SessionUpdate`] whenever any of them changes. Local
//! edits are applied optimistically and sent as full-document snapshots;
//! inbound snapshots replace local state wholesale.

pub mod auth;
pub mod connection;
pub mod directory;
pub mod document;
pub mod editor;
pub mod presence;
pub mod protocol;
pub mod session;

pub use auth::{AuthProvider, CredentialStore, Credentials};
pub use connection::{
    ConnectionConfig, ConnectionManager, ConnectionStatus, Emitter, MemoryHub, MemoryTransport,
    Transport, TransportEvent, WsTransport,
};
pub use directory::{DirectoryClient, RoomDirectory, RoomSummary};
pub use document::{Component, ComponentId, Document, DocumentSynchronizer, Properties};
pub use editor::EditorArbitrator;
pub use presence::PresenceTracker;
pub use protocol::{EditorClaim, GeneratedCode, InboundEvent, User};
pub use session::{RoomSession, SessionOptions, SessionUpdate};
