//! Room session: the outward-facing API over the synchronization core.

mod room;
mod types;

pub use room::RoomSession;
pub use types::{SessionOptions, SessionUpdate};
