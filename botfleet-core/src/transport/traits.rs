//! Transport and TransportFactory traits

use async_trait::async_trait;

use super::hooks::SessionHooks;
use crate::error::TransportError;

/// Everything a transport needs to open a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub address: String,
    pub port: u16,
    pub auth_token: Option<String>,
    pub username: String,
    /// Name given to the transport's background task in logs
    pub label: String,
}

impl ConnectParams {
    /// `address:port` as passed to the socket layer
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// One network connection
///
/// Implementations run their own receive loop once connected and must fire
/// [`SessionHooks::on_exit`] when that loop ends for any reason, including
/// a caller-requested [`Transport::disconnect`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the connection, blocking until it succeeds, fails or times out
    async fn connect(&self) -> Result<(), TransportError>;

    /// Request a graceful disconnect
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Whether the connection is currently up
    fn connected(&self) -> bool;
}

/// Factory for creating transports
///
/// Enables dependency injection of transport implementations.
pub trait TransportFactory: Send + Sync {
    /// Build an unconnected transport
    ///
    /// An error here means the transport itself could not be constructed,
    /// which is distinct from a failed connect.
    fn create(
        &self,
        params: ConnectParams,
        hooks: SessionHooks,
    ) -> Result<Box<dyn Transport>, TransportError>;
}
