//! Termination notifications from a transport's background task
//!
//! Transports never call into the registry. They fire [`SessionHooks`],
//! which log and push a [`TerminationEvent`] onto the owning registry's
//! channel. The registry's supervisor task performs the removal.

use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::TransportError;

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationCause {
    /// The receive loop ended (peer close, caller disconnect)
    Exit,
    /// A protocol or I/O error ended the receive loop
    Exception(String),
}

/// A session has terminated and should leave its registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationEvent {
    pub name: String,
    pub session_id: Uuid,
    pub cause: TerminationCause,
}

pub type TerminationSender = mpsc::UnboundedSender<TerminationEvent>;

/// Exception and exit handlers handed to a transport at construction
#[derive(Debug, Clone)]
pub struct SessionHooks {
    name: String,
    session_id: Uuid,
    sink: Arc<RwLock<TerminationSender>>,
}

impl SessionHooks {
    pub fn new(name: impl Into<String>, session_id: Uuid, sink: TerminationSender) -> Self {
        Self {
            name: name.into(),
            session_id,
            sink: Arc::new(RwLock::new(sink)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Report an error from the receive loop, then take the exit path
    ///
    /// Safe to call from any task; never blocks.
    pub fn on_exception(&self, error: &TransportError) {
        warn!(bot = %self.name, error = %error, "Exception at bot");
        self.exit_with(TerminationCause::Exception(error.to_string()));
    }

    /// Report that the receive loop has ended
    ///
    /// Safe to call from any task; never blocks.
    pub fn on_exit(&self) {
        self.exit_with(TerminationCause::Exit);
    }

    /// Point these hooks (and every clone of them) at another registry
    pub fn rebind(&self, sink: TerminationSender) {
        let mut guard = self.sink.write().unwrap_or_else(|e| e.into_inner());
        *guard = sink;
    }

    fn exit_with(&self, cause: TerminationCause) {
        warn!(bot = %self.name, "Bot disconnected");

        let event = TerminationEvent {
            name: self.name.clone(),
            session_id: self.session_id,
            cause,
        };

        let sink = self.sink.read().unwrap_or_else(|e| e.into_inner());
        if sink.send(event).is_err() {
            debug!(bot = %self.name, "Registry is gone, dropping termination event");
        }
    }
}
