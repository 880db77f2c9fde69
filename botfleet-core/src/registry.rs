//! BotRegistry: the name -> session directory
//!
//! Every read and write of the map goes through one lock, held only for
//! the map operation itself. Connecting and stopping always happen with the
//! lock released, so a slow connect never blocks unrelated callers.
//!
//! Sessions report termination through a channel owned by the registry. A
//! supervisor task drains it and removes the terminated bot, which is the
//! only way a bot leaves the registry without a caller asking.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::handoff::{self, SessionHandoff};
use crate::session::{BotInfo, BotSession, is_valid_bot_name};
use crate::transport::{TerminationEvent, TerminationSender, TransportFactory};

/// Thread-safe directory of named bots
pub struct BotRegistry {
    sessions: RwLock<HashMap<String, Arc<BotSession>>>,
    factory: Arc<dyn TransportFactory>,
    options: RegistryConfig,
    events: TerminationSender,
}

impl BotRegistry {
    /// Create a registry and start its termination supervisor
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(factory: Arc<dyn TransportFactory>, options: RegistryConfig) -> Arc<Self> {
        let (events, rx) = mpsc::unbounded_channel();
        let registry = Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            factory,
            options,
            events,
        });
        tokio::spawn(supervise(Arc::downgrade(&registry), rx));
        registry
    }

    /// Connect a new bot and register it under `name`
    ///
    /// Returns `Ok(false)` if the connection attempt failed, leaving no
    /// entry. An existing bot with the same name is replaced without being
    /// stopped.
    pub async fn add_session(
        &self,
        name: &str,
        address: &str,
        port: u16,
    ) -> Result<bool, RegistryError> {
        if !is_valid_bot_name(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }

        let session = BotSession::connect(
            self.factory.as_ref(),
            &self.options,
            self.events.clone(),
            name,
            address,
            port,
        )
        .await?;

        // Checked under the write lock: a transport clears its flag before
        // reporting termination, and the supervisor needs this lock to act on
        // the report, so a bot seen connected here is removed later if it dies.
        let replaced = {
            let mut sessions = self.sessions.write().await;
            if !session.connected() {
                return Ok(false);
            }
            sessions.insert(name.to_string(), Arc::new(session))
        };

        if replaced.is_some() {
            debug!(bot = %name, "Replaced existing bot, previous session left running");
        }
        info!(bot = %name, address = %address, port, "Bot added");
        Ok(true)
    }

    /// Look up a bot by name
    pub async fn get_session(&self, name: &str) -> Option<Arc<BotSession>> {
        self.sessions.read().await.get(name).cloned()
    }

    pub async fn has_session(&self, name: &str) -> bool {
        self.get_session(name).await.is_some()
    }

    /// Remove a bot and stop it
    ///
    /// Returns false if no bot had that name. Stop failures are swallowed:
    /// the name is freed either way.
    pub async fn remove_session(&self, name: &str) -> bool {
        let removed = self.sessions.write().await.remove(name);
        match removed {
            Some(session) => {
                stop_quietly(&session).await;
                true
            }
            None => false,
        }
    }

    /// Snapshot of all registered names
    pub async fn list_names(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    /// Snapshot of all registered bots
    pub async fn list_sessions(&self) -> Vec<BotInfo> {
        self.sessions
            .read()
            .await
            .values()
            .map(|session| session.info())
            .collect()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Admit sessions handed over by a previous registry
    ///
    /// Entries that are not a proper name mapped to a live session are
    /// skipped. Accepted sessions report termination to this registry from
    /// now on. Returns how many were imported.
    pub async fn import_sessions(&self, batch: SessionHandoff) -> usize {
        let mut imported = 0;
        let mut sessions = self.sessions.write().await;

        for (key, value) in batch.into_entries() {
            let Some((name, session)) = handoff::accept(key, value) else {
                debug!("Skipping malformed hand-off entry");
                continue;
            };

            // Rebind before the liveness check: a bot dying after this point
            // reports here, and the report waits for the lock we hold.
            session.rebind(self.events.clone());
            if !session.connected() {
                debug!(bot = %name, "Skipping disconnected bot in hand-off");
                continue;
            }

            sessions.insert(name.clone(), session);
            info!(bot = %name, "Imported bot from previous registry instance");
            imported += 1;
        }

        imported
    }

    /// Move every bot into a hand-off batch for a successor registry
    ///
    /// The registry is empty afterwards; no bot is stopped.
    pub async fn export_sessions(&self) -> SessionHandoff {
        let drained: Vec<_> = self.sessions.write().await.drain().collect();

        let mut handoff = SessionHandoff::new();
        for (name, session) in drained {
            handoff.insert(name, session);
        }
        info!(count = handoff.len(), "Exported bots for hand-off");
        handoff
    }

    /// Remove and stop every bot; returns how many were removed
    pub async fn remove_all(&self) -> usize {
        let drained: Vec<_> = self.sessions.write().await.drain().collect();
        for (_, session) in &drained {
            stop_quietly(session).await;
        }
        drained.len()
    }

    /// Remove `name` only if it is still the session that terminated
    async fn handle_termination(&self, event: TerminationEvent) {
        let removed = {
            let mut sessions = self.sessions.write().await;
            if is_current(&sessions, &event.name, event.session_id) {
                sessions.remove(&event.name)
            } else {
                None
            }
        };

        match removed {
            Some(session) => {
                debug!(bot = %event.name, cause = ?event.cause, "Removing terminated bot");
                stop_quietly(&session).await;
            }
            None => debug!(bot = %event.name, "Terminated bot already gone"),
        }
    }
}

fn is_current(sessions: &HashMap<String, Arc<BotSession>>, name: &str, id: Uuid) -> bool {
    sessions.get(name).is_some_and(|session| session.id() == id)
}

async fn stop_quietly(session: &BotSession) {
    if let Err(e) = session.stop().await {
        debug!(bot = %session.name(), error = %e, "Ignoring stop failure");
    }
}

async fn supervise(
    registry: Weak<BotRegistry>,
    mut events: mpsc::UnboundedReceiver<TerminationEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(registry) = registry.upgrade() else {
            break;
        };
        registry.handle_termination(event).await;
    }
    debug!("Termination supervisor stopped");
}
