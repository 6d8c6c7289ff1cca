//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod generation;
mod log;
mod markup;
mod server;

pub use generation::*;
pub use log::*;
pub use markup::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatterConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub generation: GenerationConfig,
    pub markup: MarkupConfig,
}
