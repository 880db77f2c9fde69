//! CLI subcommands

pub mod check;
pub mod run;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use botfleet_core::FleetConfig;

/// Config file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "botfleet.toml";

pub(crate) fn config_path(arg: Option<PathBuf>) -> PathBuf {
    arg.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub(crate) fn load_config(path: &Path) -> Result<FleetConfig> {
    FleetConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))
}
