//! Console command parsing
//!
//! One command per line: `add <name> <address> [port]`, `remove <name>`,
//! `list`, `info <name>`, `help`, `quit`.

use botfleet_core::DEFAULT_PORT;

pub const HELP: &str = "\
Commands:
  add <name> <address> [port]   connect a new bot
  remove <name>                 disconnect and remove a bot
  list                          list connected bots
  info <name>                   show one bot
  help                          show this help
  quit                          remove all bots and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Add {
        name: String,
        address: String,
        port: u16,
    },
    Remove {
        name: String,
    },
    List,
    Info {
        name: String,
    },
    Help,
    Quit,
}

/// Parse one console line; `Ok(None)` for a blank line
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("add", [name, address]) => ConsoleCommand::Add {
            name: name.to_string(),
            address: address.to_string(),
            port: DEFAULT_PORT,
        },
        ("add", [name, address, port]) => ConsoleCommand::Add {
            name: name.to_string(),
            address: address.to_string(),
            port: port
                .parse()
                .map_err(|_| format!("Invalid port: {}", port))?,
        },
        ("add", _) => return Err("Usage: add <name> <address> [port]".to_string()),
        ("remove" | "rm", [name]) => ConsoleCommand::Remove {
            name: name.to_string(),
        },
        ("remove" | "rm", _) => return Err("Usage: remove <name>".to_string()),
        ("info", [name]) => ConsoleCommand::Info {
            name: name.to_string(),
        },
        ("info", _) => return Err("Usage: info <name>".to_string()),
        ("list" | "ls", []) => ConsoleCommand::List,
        ("help" | "?", _) => ConsoleCommand::Help,
        ("quit" | "exit", []) => ConsoleCommand::Quit,
        (other, _) => return Err(format!("Unknown command: {} (try 'help')", other)),
    };

    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_none() {
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn add_defaults_port() {
        assert_eq!(
            parse("add bot1 localhost").unwrap(),
            Some(ConsoleCommand::Add {
                name: "bot1".to_string(),
                address: "localhost".to_string(),
                port: DEFAULT_PORT,
            })
        );
    }

    #[test]
    fn add_with_port() {
        assert_eq!(
            parse("ADD bot1 mc.example.com 25570").unwrap(),
            Some(ConsoleCommand::Add {
                name: "bot1".to_string(),
                address: "mc.example.com".to_string(),
                port: 25570,
            })
        );
    }

    #[test]
    fn add_rejects_bad_port() {
        let err = parse("add bot1 localhost 99999").unwrap_err();
        assert!(err.contains("Invalid port"));
    }

    #[test]
    fn add_requires_address() {
        assert!(parse("add bot1").is_err());
    }

    #[test]
    fn remove_and_aliases() {
        let expected = Some(ConsoleCommand::Remove {
            name: "bot1".to_string(),
        });
        assert_eq!(parse("remove bot1").unwrap(), expected);
        assert_eq!(parse("rm bot1").unwrap(), expected);
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("list").unwrap(), Some(ConsoleCommand::List));
        assert_eq!(parse("help").unwrap(), Some(ConsoleCommand::Help));
        assert_eq!(parse("quit").unwrap(), Some(ConsoleCommand::Quit));
        assert_eq!(
            parse("info bot1").unwrap(),
            Some(ConsoleCommand::Info {
                name: "bot1".to_string()
            })
        );
    }

    #[test]
    fn unknown_command_is_error() {
        let err = parse("teleport bot1").unwrap_err();
        assert!(err.contains("Unknown command"));
    }
}
