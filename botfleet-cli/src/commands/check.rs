//! Config validation command

use std::path::PathBuf;

use anyhow::Result;
use botfleet_core::FleetConfig;
use clap::Args;

use super::{config_path, load_config};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the config file (default: botfleet.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the resolved config as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let path = config_path(args.config);
    let config = load_config(&path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", render(&config));
    }
    Ok(())
}

fn render(config: &FleetConfig) -> String {
    let mut out = format!(
        "Connect timeout: {}ms\nLabel prefix: {}\n",
        config.transport.connect_timeout_ms, config.registry.label_prefix
    );
    if config.bots.is_empty() {
        out.push_str("No bots configured\n");
    } else {
        out.push_str("Bots:\n");
        for bot in &config.bots {
            out.push_str(&format!("  {} -> {}:{}\n", bot.name, bot.address, bot.port));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lists_bots() {
        let config = FleetConfig::from_toml_str(
            "[[bot]]\nname = \"bot1\"\naddress = \"localhost\"\nport = 25570\n",
        )
        .unwrap();

        let out = render(&config);

        assert!(out.contains("bot1 -> localhost:25570"));
    }

    #[test]
    fn render_empty_config() {
        let out = render(&FleetConfig::default());
        assert!(out.contains("No bots configured"));
        assert!(out.contains("Label prefix: Bot"));
    }

    #[test]
    fn run_rejects_invalid_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("botfleet.toml");
        std::fs::write(&path, "[[bot]]\nname = \"\"\naddress = \"x\"\n").unwrap();

        let result = run(CheckArgs {
            config: Some(path),
            json: false,
        });

        assert!(result.is_err());
    }
}
