//! Mock transport for testing
//!
//! MockTransport never touches the network. MockTransportFactory decides
//! per bot name whether construction, connect and disconnect succeed, and
//! keeps each bot's [`SessionHooks`] so tests can simulate the receive
//! loop failing or exiting, or the server dropping the connection.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::hooks::SessionHooks;
use super::traits::{ConnectParams, Transport, TransportFactory};
use crate::error::TransportError;

/// Mock implementation of Transport
pub struct MockTransport {
    params: ConnectParams,
    hooks: SessionHooks,
    connected: Arc<AtomicBool>,
    refuse_connect: bool,
    fail_disconnect: bool,
    exit_on_disconnect: bool,
    connect_delay: Option<Duration>,
    disconnects: Arc<AtomicUsize>,
}

impl MockTransport {
    /// A transport that connects and disconnects cleanly
    pub fn new(params: ConnectParams, hooks: SessionHooks) -> Self {
        Self {
            params,
            hooks,
            connected: Arc::new(AtomicBool::new(false)),
            refuse_connect: false,
            fail_disconnect: false,
            exit_on_disconnect: true,
            connect_delay: None,
            disconnects: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        if self.refuse_connect {
            return Err(TransportError::ConnectFailed {
                addr: self.params.socket_addr(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "mock refused"),
            });
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnect {
            return Err(TransportError::Disconnect("mock disconnect failure".to_string()));
        }
        let was_connected = self.connected.swap(false, Ordering::SeqCst);
        if was_connected && self.exit_on_disconnect {
            self.hooks.on_exit();
        }
        Ok(())
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Factory producing [`MockTransport`]s
pub struct MockTransportFactory {
    refused: Mutex<HashSet<String>>,
    unbuildable: Mutex<HashSet<String>>,
    fail_disconnect: AtomicBool,
    exit_on_disconnect: AtomicBool,
    connect_delay: Mutex<Option<Duration>>,
    hooks: Mutex<HashMap<String, SessionHooks>>,
    params: Mutex<HashMap<String, ConnectParams>>,
    links: Mutex<HashMap<String, Arc<AtomicBool>>>,
    disconnects: Arc<AtomicUsize>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self {
            refused: Mutex::new(HashSet::new()),
            unbuildable: Mutex::new(HashSet::new()),
            fail_disconnect: AtomicBool::new(false),
            exit_on_disconnect: AtomicBool::new(true),
            connect_delay: Mutex::new(None),
            hooks: Mutex::new(HashMap::new()),
            params: Mutex::new(HashMap::new()),
            links: Mutex::new(HashMap::new()),
            disconnects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make connects for `name` fail
    pub fn refuse(self, name: &str) -> Self {
        lock(&self.refused).insert(name.to_string());
        self
    }

    /// Make transport construction for `name` fail
    pub fn unbuildable(self, name: &str) -> Self {
        lock(&self.unbuildable).insert(name.to_string());
        self
    }

    /// Make every disconnect return an error
    pub fn with_failing_disconnect(self) -> Self {
        self.fail_disconnect.store(true, Ordering::SeqCst);
        self
    }

    /// Whether disconnect fires the exit hook (default true)
    pub fn with_exit_on_disconnect(self, enabled: bool) -> Self {
        self.exit_on_disconnect.store(enabled, Ordering::SeqCst);
        self
    }

    /// Delay every connect
    pub fn with_connect_delay(self, delay: Duration) -> Self {
        *lock(&self.connect_delay) = Some(delay);
        self
    }

    /// Hooks of the most recent transport created for `name`
    pub fn hooks(&self, name: &str) -> Option<SessionHooks> {
        lock(&self.hooks).get(name).cloned()
    }

    /// Params of the most recent transport created for `name`
    pub fn params(&self, name: &str) -> Option<ConnectParams> {
        lock(&self.params).get(name).cloned()
    }

    /// Drop the most recent connection for `name` from the server side
    ///
    /// Clears the transport's connected flag, then fires its exit hook.
    /// Returns false if that transport was not connected.
    pub fn sever(&self, name: &str) -> bool {
        let Some(link) = lock(&self.links).get(name).cloned() else {
            return false;
        };
        if !link.swap(false, Ordering::SeqCst) {
            return false;
        }
        if let Some(hooks) = self.hooks(name) {
            hooks.on_exit();
        }
        true
    }

    /// Total disconnect calls across all transports
    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

impl Default for MockTransportFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportFactory for MockTransportFactory {
    fn create(
        &self,
        params: ConnectParams,
        hooks: SessionHooks,
    ) -> Result<Box<dyn Transport>, TransportError> {
        let name = hooks.name().to_string();

        if lock(&self.unbuildable).contains(&name) {
            return Err(TransportError::InvalidAddress(params.socket_addr()));
        }

        lock(&self.hooks).insert(name.clone(), hooks.clone());
        lock(&self.params).insert(name.clone(), params.clone());

        let mut transport = MockTransport::new(params, hooks);
        transport.refuse_connect = lock(&self.refused).contains(&name);
        transport.fail_disconnect = self.fail_disconnect.load(Ordering::SeqCst);
        transport.exit_on_disconnect = self.exit_on_disconnect.load(Ordering::SeqCst);
        transport.connect_delay = *lock(&self.connect_delay);
        transport.disconnects = Arc::clone(&self.disconnects);
        lock(&self.links).insert(name, Arc::clone(&transport.connected));

        Ok(Box::new(transport))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
