//! Fleet configuration
//!
//! Stored as TOML, usually in `botfleet.toml`:
//!
//! ```toml
//! [registry]
//! label_prefix = "Bot"
//!
//! [transport]
//! connect_timeout_ms = 10000
//!
//! [[bot]]
//! name = "bot1"
//! address = "127.0.0.1"
//! port = 25565
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::session::is_valid_bot_name;

/// Default server port for bots that don't specify one
pub const DEFAULT_PORT: u16 = 25565;

/// Default connect timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Environment variable overriding `transport.connect_timeout_ms`
pub const CONNECT_TIMEOUT_ENV: &str = "BOTFLEET_CONNECT_TIMEOUT_MS";

/// Complete fleet configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FleetConfig {
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    /// Bots admitted at startup
    #[serde(default, rename = "bot")]
    pub bots: Vec<BotSpec>,
}

/// Options applied by the registry to every session it creates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryConfig {
    /// Prefix of the label given to each transport's background task
    #[serde(default = "default_label_prefix")]
    pub label_prefix: String,

    /// Auth token handed to every transport
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            label_prefix: default_label_prefix(),
            auth_token: None,
        }
    }
}

impl RegistryConfig {
    /// Observability label for the bot called `name`
    pub fn label_for(&self, name: &str) -> String {
        format!("{} {}", self.label_prefix, name)
    }
}

/// Transport settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// A bot to admit at startup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotSpec {
    pub name: String,
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_label_prefix() -> String {
    "Bot".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl FleetConfig {
    /// Load configuration from a TOML file
    ///
    /// Returns the default configuration if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };

        config.apply_env_overrides()?;

        tracing::debug!(
            path = %path.display(),
            bots = config.bots.len(),
            connect_timeout_ms = config.transport.connect_timeout_ms,
            "FleetConfig loaded"
        );

        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check bot names, addresses and uniqueness
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for bot in &self.bots {
            if !is_valid_bot_name(&bot.name) {
                return Err(ConfigError::Invalid(format!(
                    "invalid bot name {:?}",
                    bot.name
                )));
            }
            if bot.address.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "bot {} has an empty address",
                    bot.name
                )));
            }
            if !seen.insert(bot.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate bot {}", bot.name)));
            }
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(CONNECT_TIMEOUT_ENV) {
            self.transport.connect_timeout_ms = value.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "{} must be a number, got {:?}",
                    CONNECT_TIMEOUT_ENV, value
                ))
            })?;
        }
        Ok(())
    }
}
