//! Raw TCP transport
//!
//! Opens a plain TCP connection and drains whatever the server sends.
//! No protocol is spoken; the transport exists so bots have a real
//! connection whose lifetime the registry can track.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, trace};

use super::hooks::SessionHooks;
use super::traits::{ConnectParams, Transport, TransportFactory};
use crate::config::TransportConfig;
use crate::error::TransportError;

const READ_BUFFER_SIZE: usize = 4096;

/// Creates [`TcpTransport`]s
pub struct TcpTransportFactory {
    config: TransportConfig,
}

impl TcpTransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

impl TransportFactory for TcpTransportFactory {
    fn create(
        &self,
        params: ConnectParams,
        hooks: SessionHooks,
    ) -> Result<Box<dyn Transport>, TransportError> {
        if params.address.trim().is_empty() || params.port == 0 {
            return Err(TransportError::InvalidAddress(params.socket_addr()));
        }
        Ok(Box::new(TcpTransport::new(params, hooks, &self.config)))
    }
}

/// A TCP connection with a background receive loop
pub struct TcpTransport {
    params: ConnectParams,
    hooks: SessionHooks,
    connect_timeout_ms: u64,
    connected: Arc<AtomicBool>,
    started: AtomicBool,
    shutdown: CancellationToken,
}

impl TcpTransport {
    pub fn new(params: ConnectParams, hooks: SessionHooks, config: &TransportConfig) -> Self {
        Self {
            params,
            hooks,
            connect_timeout_ms: config.connect_timeout_ms,
            connected: Arc::new(AtomicBool::new(false)),
            started: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    fn timed_out(&self, addr: &str) -> TransportError {
        TransportError::Timeout {
            addr: addr.to_string(),
            after_ms: self.connect_timeout_ms,
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        let addr = self.params.socket_addr();

        let limit = Duration::from_millis(self.connect_timeout_ms);

        let stream = tokio::time::timeout(limit, TcpStream::connect(&addr))
            .await
            .map_err(|_| self.timed_out(&addr))?
            .map_err(|source| TransportError::ConnectFailed {
                addr: addr.clone(),
                source,
            })?;

        self.connected.store(true, Ordering::SeqCst);
        self.started.store(true, Ordering::SeqCst);
        info!(bot = %self.hooks.name(), addr = %addr, "Connected");

        let span = info_span!("transport", label = %self.params.label);
        tokio::spawn(
            receive_loop(
                stream,
                self.hooks.clone(),
                Arc::clone(&self.connected),
                self.shutdown.clone(),
            )
            .instrument(span),
        );

        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        if !self.started.load(Ordering::SeqCst) {
            return Err(TransportError::NotConnected);
        }
        debug!(bot = %self.hooks.name(), "Disconnect requested");
        self.shutdown.cancel();
        Ok(())
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

async fn receive_loop(
    mut stream: TcpStream,
    hooks: SessionHooks,
    connected: Arc<AtomicBool>,
    shutdown: CancellationToken,
) {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    let failure = loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("Receive loop received shutdown signal");
                break None;
            }
            read = stream.read(&mut buf) => match read {
                Ok(0) => {
                    debug!("Peer closed connection");
                    break None;
                }
                Ok(n) => trace!(bytes = n, "Received"),
                Err(e) => break Some(TransportError::Io(e)),
            }
        }
    };

    connected.store(false, Ordering::SeqCst);
    drop(stream);

    match failure {
        Some(error) => hooks.on_exception(&error),
        None => hooks.on_exit(),
    }
}
