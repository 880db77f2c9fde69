//! Run the fleet with an interactive console

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use botfleet_core::transport::TcpTransportFactory;
use botfleet_core::{BotInfo, BotRegistry};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::{config_path, load_config};
use crate::console::{self, ConsoleCommand, HELP};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the config file (default: botfleet.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let path = config_path(args.config);
    let config = load_config(&path)?;

    let factory = Arc::new(TcpTransportFactory::new(config.transport.clone()));
    let registry = BotRegistry::spawn(factory, config.registry.clone());

    for bot in &config.bots {
        println!("{}", add_bot(&registry, &bot.name, &bot.address, bot.port).await);
    }

    println!("Type 'help' for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl-C, shutting down");
                break;
            }
            line = lines.next_line() => line.context("Failed to read console input")?,
        };
        let Some(line) = line else {
            break;
        };

        match console::parse(&line) {
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(command)) => println!("{}", execute(&registry, command).await),
            Ok(None) => {}
            Err(message) => println!("{}", message),
        }
    }

    let removed = registry.remove_all().await;
    info!(count = removed, "Stopped all bots");
    Ok(())
}

/// Run one console command and return what to print
async fn execute(registry: &BotRegistry, command: ConsoleCommand) -> String {
    match command {
        ConsoleCommand::Add {
            name,
            address,
            port,
        } => add_bot(registry, &name, &address, port).await,
        ConsoleCommand::Remove { name } => {
            if registry.remove_session(&name).await {
                format!("Bot {} removed", name)
            } else {
                format!("No bot named {}", name)
            }
        }
        ConsoleCommand::List => render_list(registry.list_sessions().await),
        ConsoleCommand::Info { name } => match registry.get_session(&name).await {
            Some(session) => render_bot(&session.info()),
            None => format!("No bot named {}", name),
        },
        ConsoleCommand::Help => HELP.to_string(),
        ConsoleCommand::Quit => String::new(),
    }
}

async fn add_bot(registry: &BotRegistry, name: &str, address: &str, port: u16) -> String {
    match registry.add_session(name, address, port).await {
        Ok(true) => format!("Bot {} connected to {}:{}", name, address, port),
        Ok(false) => format!("Bot {} failed to connect to {}:{}", name, address, port),
        Err(e) => {
            warn!(bot = %name, error = %e, "Failed to add bot");
            format!("Bot {} could not be created: {}", name, e)
        }
    }
}

fn render_list(mut bots: Vec<BotInfo>) -> String {
    if bots.is_empty() {
        return "No bots connected".to_string();
    }
    bots.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = format!("Bots ({}):", bots.len());
    for bot in &bots {
        out.push_str(&format!("\n  {} - {}:{}", bot.name, bot.address, bot.port));
    }
    out
}

fn render_bot(bot: &BotInfo) -> String {
    format!(
        "{}\n  Address: {}:{}\n  Connected: {}\n  Since: {}",
        bot.name,
        bot.address,
        bot.port,
        bot.connected,
        bot.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}
