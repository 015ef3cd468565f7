//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [server]                 # where the wiki lives
//! base_url = "https://wiki.example.org"
//! timeout_secs = 30
//!
//! [session]                # page sessions bind to
//! page = "/bin/view/Main/WebHome"
//!
//! [preferences]            # preloaded into every session
//! SCRIPTURLPATH = "/bin"
//!
//! [logging]
//! level = "info"
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Default server URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoswikiConfig {
    /// Server connection.
    pub server: Option<ServerConfig>,

    /// Session defaults.
    pub session: Option<SessionConfig>,

    /// Preferences preloaded into every session's cache.
    pub preferences: BTreeMap<String, String>,

    /// Logging.
    pub logging: Option<LoggingConfig>,
}

impl FoswikiConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config written by `config init`: every section at its defaults.
    pub fn starter() -> Self {
        Self {
            server: Some(ServerConfig::default()),
            logging: Some(LoggingConfig::default()),
            ..Self::default()
        }
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: FoswikiConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: FoswikiConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if other.session.is_some() {
            self.session = other.session;
        }

        self.preferences.extend(other.preferences);

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Server settings, falling back to defaults.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Logging settings, falling back to defaults.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Default page location for sessions, if configured.
    pub fn page(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.page.as_deref())
    }

    fn validate(&self) -> Result<()> {
        if let Some(server) = &self.server {
            if server.base_url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "server.base_url".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            if server.timeout_secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "server.timeout_secs".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Server connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL script paths are resolved against.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Custom user agent.
    pub user_agent: Option<String>,
}

impl ServerConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Page sessions bind to when none is given.
    pub page: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Console filter directive (e.g. `info`, `foswiki_client=debug`).
    pub level: String,
    /// Whether to also write a JSON log file.
    pub file: bool,
    /// Directory for log files. Defaults to `logs/` in the config dir.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: true,
            dir: None,
        }
    }
}
