//! Configuration for the Intersul console.
//!
//! Provides TOML-based configuration with:
//! - API endpoint and request timeout (`[api]`)
//! - Application identity and runtime environment (`[app]`)
//! - Query cache sizing and cleanup cadence (`[cache]`)
//! - Local storage location for the persisted session (`[storage]`)
//!
//! Files are layered (user config, then project-local `intersul.toml`) and
//! environment variables are applied last.

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, Layer, LoadedConfig, load_config, load_config_file, load_config_with_options,
    xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
