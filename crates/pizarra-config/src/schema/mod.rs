//! Configuration schema types for Pizarra.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod directory;
mod hub;
mod session;
mod system;

pub use directory::*;
pub use hub::*;
pub use session::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PizarraConfig {
    pub hub: HubConfig,
    pub directory: DirectoryConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}
