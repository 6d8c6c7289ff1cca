//! Patter configuration.
//!
//! TOML-based configuration for the relay server, the conversation log,
//! the generation backend and the reasoning-markup sanitizer. Every
//! section uses serde defaults so a partial (or missing) file works.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    GenerationConfig, LogConfig, MarkupConfig, PatterConfig, ServerConfig, SessionScope,
};

use patter_common::ConfigError;
use std::path::Path;

/// Load config from an explicit path, or from the platform default path
/// (creating it when missing) if `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<PatterConfig, ConfigError> {
    match path {
        Some(p) => toml_loader::load_from_path(p),
        None => toml_loader::load_default(),
    }
}
