//! The shared whiteboard document and the synchronizer that owns it.

mod synchronizer;
mod types;

pub use synchronizer::{Changes, DocumentSynchronizer, EditContext};
pub use types::{Component, ComponentId, Document, Properties};
