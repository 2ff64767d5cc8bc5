//! Optional TOML configuration for server and client.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Top-level configuration file.
///
/// ```toml
/// [server]
/// host = "0.0.0.0"
///
/// [client]
/// log_file = "tictac_duel_client.log"
///
/// [logging]
/// filter = "info"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct DuelConfig {
    /// Server settings.
    #[serde(default)]
    server: ServerSettings,

    /// Client settings.
    #[serde(default)]
    client: ClientSettings,

    /// Logging settings.
    #[serde(default)]
    logging: LoggingSettings,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Interface the listeners bind to.
    #[serde(default = "default_host")]
    host: String,
}

/// `[client]` section.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientSettings {
    /// File the client writes its logs to.
    #[serde(default = "default_log_file")]
    log_file: PathBuf,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    filter: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("tictac_duel_client.log")
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl DuelConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.server.host, filter = %config.logging.filter, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Replaces the server host.
    pub fn set_host(&mut self, host: impl Into<String>) {
        self.server.host = host.into();
    }

    /// Replaces the client log file.
    pub fn set_log_file(&mut self, log_file: impl Into<PathBuf>) {
        self.client.log_file = log_file.into();
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
