//! Error types for botfleet-core

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for botfleet-core
#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by a transport collaborator
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to connect to {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out connecting to {addr} after {after_ms}ms")]
    Timeout { addr: String, after_ms: u64 },

    #[error("Transport is not connected")]
    NotConnected,

    #[error("Failed to disconnect: {0}")]
    Disconnect(String),

    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the bot registry
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid bot name: {0:?}")]
    InvalidName(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors from loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
