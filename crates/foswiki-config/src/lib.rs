//! Configuration system for the Foswiki client tools.
//!
//! Provides TOML-based configuration with:
//! - Server connection settings (`[server]`)
//! - A default page to bind sessions to (`[session]`)
//! - Preferences preloaded into every session (`[preferences]`)
//! - Log level and file output (`[logging]`)
//! - Config file layering (user config + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigPaths, ConfigSource, Layer, LoadedConfig, load_config, load_config_file,
    load_config_with_options, save_config, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
