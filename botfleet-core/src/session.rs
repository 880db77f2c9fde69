//! A single bot: one named transport connection
//!
//! A BotSession connects once at construction and is discarded after it
//! terminates. It never removes itself from a registry directly; the
//! transport's exit hook reports termination and the registry reacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::RegistryConfig;
use crate::error::TransportError;
use crate::transport::{
    ConnectParams, SessionHooks, TerminationSender, Transport, TransportFactory,
};

/// Longest accepted bot name
pub const MAX_NAME_LEN: usize = 64;

/// Whether `name` can key a bot: non-empty, bounded, no whitespace or
/// control characters
pub fn is_valid_bot_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= MAX_NAME_LEN
        && !name.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Serializable snapshot of a bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotInfo {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub connected: bool,
    pub created_at: DateTime<Utc>,
}

/// One managed network-client connection
pub struct BotSession {
    id: Uuid,
    name: String,
    address: String,
    port: u16,
    created_at: DateTime<Utc>,
    hooks: SessionHooks,
    transport: Box<dyn Transport>,
}

impl BotSession {
    /// Build a transport for `name` and connect it
    ///
    /// Returns `Err` only if the transport could not be constructed. A
    /// failed connect still yields a session, with `connected()` false.
    pub async fn connect(
        factory: &dyn TransportFactory,
        options: &RegistryConfig,
        sink: TerminationSender,
        name: &str,
        address: &str,
        port: u16,
    ) -> Result<Self, TransportError> {
        let id = Uuid::new_v4();
        let hooks = SessionHooks::new(name, id, sink);
        let params = ConnectParams {
            address: address.to_string(),
            port,
            auth_token: options.auth_token.clone(),
            username: name.to_string(),
            label: options.label_for(name),
        };

        let transport = factory.create(params, hooks.clone())?;

        debug!(bot = %name, address = %address, port, "Connecting bot");
        if let Err(e) = transport.connect().await {
            warn!(bot = %name, address = %address, port, error = %e, "Bot failed to connect");
        }

        Ok(Self {
            id,
            name: name.to_string(),
            address: address.to_string(),
            port,
            created_at: Utc::now(),
            hooks,
            transport,
        })
    }

    /// Request a graceful disconnect
    ///
    /// The transport's exit hook may still fire afterwards.
    pub async fn stop(&self) -> Result<(), TransportError> {
        self.transport.disconnect().await
    }

    pub fn connected(&self) -> bool {
        self.transport.connected()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn info(&self) -> BotInfo {
        BotInfo {
            name: self.name.clone(),
            address: self.address.clone(),
            port: self.port,
            connected: self.connected(),
            created_at: self.created_at,
        }
    }

    /// Send future termination events to another registry
    pub(crate) fn rebind(&self, sink: TerminationSender) {
        self.hooks.rebind(sink);
    }
}

impl std::fmt::Debug for BotSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotSession")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("address", &self.address)
            .field("port", &self.port)
            .field("connected", &self.connected())
            .finish()
    }
}
