//! In-memory hand-off of live sessions between registry instances
//!
//! A registry being replaced (plugin reload, hot swap) exports its
//! sessions into a [`SessionHandoff`]; its successor imports them without
//! reconnecting. Entries are opaque `Any` boxes until the importing side
//! checks their types, so a batch assembled by foreign code can carry
//! malformed entries that are skipped on import.

use std::any::Any;
use std::sync::Arc;

use crate::session::{BotSession, is_valid_bot_name};

pub type HandoffKey = Box<dyn Any + Send + Sync>;
pub type HandoffValue = Box<dyn Any + Send + Sync>;

/// A batch of sessions in transit between registries
#[derive(Default)]
pub struct SessionHandoff {
    entries: Vec<(HandoffKey, HandoffValue)>,
}

impl SessionHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session under `name`
    pub fn insert(&mut self, name: impl Into<String>, session: Arc<BotSession>) {
        self.entries.push((Box::new(name.into()), Box::new(session)));
    }

    /// Add an entry whose types are only checked on import
    pub fn insert_raw(&mut self, key: HandoffKey, value: HandoffValue) {
        self.entries.push((key, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (HandoffKey, HandoffValue)> {
        self.entries.into_iter()
    }
}

impl std::fmt::Debug for SessionHandoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandoff")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Type-check one entry: a proper bot name mapped to the session of
/// that name
///
/// A session filed under another name is rejected: its termination
/// events carry its own name and could never remove the entry.
pub(crate) fn accept(key: HandoffKey, value: HandoffValue) -> Option<(String, Arc<BotSession>)> {
    let name = match key.downcast::<String>() {
        Ok(name) => *name,
        Err(key) => (*key.downcast::<&'static str>().ok()?).to_string(),
    };
    if !is_valid_bot_name(&name) {
        return None;
    }
    let session = *value.downcast::<Arc<BotSession>>().ok()?;
    if session.name() != name {
        return None;
    }
    Some((name, session))
}
