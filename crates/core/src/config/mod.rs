//! Configuration loading and validation.
//!
//! Configuration comes from a TOML file merged with `PRAMEN_`-prefixed
//! environment variables (e.g. `PRAMEN_SERVER_PORT=9000`). Every section has
//! working defaults, so an empty file is a valid starting point.

mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_str};
pub use types::*;
pub use validate::validate_config;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
