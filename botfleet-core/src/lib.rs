//! botfleet-core: Core library for botfleet
//!
//! This crate keeps a set of named network-client bots connected to remote
//! servers:
//!
//! - **Registry** - [`BotRegistry`] maps bot names to live sessions and
//!   removes bots whose connection ends
//! - **Sessions** - [`BotSession`] wraps one transport connection
//! - **Transports** - [`transport::Transport`] and
//!   [`transport::TransportFactory`] abstract the network layer, with a TCP
//!   and a mock implementation
//! - **Hand-off** - [`SessionHandoff`] moves live bots from one registry
//!   instance to its successor
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use botfleet_core::{BotRegistry, FleetConfig};
//! use botfleet_core::transport::TcpTransportFactory;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FleetConfig::default();
//!     let factory = Arc::new(TcpTransportFactory::new(config.transport.clone()));
//!     let registry = BotRegistry::spawn(factory, config.registry.clone());
//!
//!     if registry.add_session("bot1", "127.0.0.1", 25565).await? {
//!         println!("bots: {:?}", registry.list_names().await);
//!     }
//!     registry.remove_session("bot1").await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! caller ──add/get/remove──▶ BotRegistry ◀──TerminationEvent── supervisor task
//!                               │                                    ▲
//!                               ▼                                    │
//!                           BotSession ──owns──▶ Transport ──hooks───┘
//!                                                (receive loop)
//! ```

pub mod config;
pub mod error;
pub mod handoff;
pub mod registry;
pub mod session;
pub mod transport;

// Re-export key types for convenience
pub use config::{BotSpec, DEFAULT_PORT, FleetConfig, RegistryConfig, TransportConfig};
pub use error::{ConfigError, FleetError, RegistryError, TransportError};
pub use handoff::SessionHandoff;
pub use registry::BotRegistry;
pub use session::{BotInfo, BotSession, is_valid_bot_name};
