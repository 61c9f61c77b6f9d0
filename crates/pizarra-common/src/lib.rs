pub mod errors;
pub mod events;
pub mod id;

pub use errors::{ConfigError, PizarraError, SyncError};
pub use events::EventBus;
pub use id::{new_component_id, new_id};

pub type Result<T> = std::result::Result<T, PizarraError>;
