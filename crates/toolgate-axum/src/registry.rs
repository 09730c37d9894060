//! Live session registry: session id → inbound message sender.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

type Senders = HashMap<Uuid, mpsc::Sender<Value>>;

/// Maps live session ids to the sender feeding each session's relay.
///
/// Entries are added when an SSE stream opens and removed when the
/// [`Registration`] held by its session task is dropped. Critical sections
/// never await, so a plain `RwLock` is enough.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<Senders>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` until the returned guard is dropped.
    pub fn register(self: &Arc<Self>, id: Uuid, inbound: mpsc::Sender<Value>) -> Registration {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, inbound);
        Registration {
            registry: Arc::clone(self),
            id,
        }
    }

    /// Sender for `id`, if the session is still registered.
    pub fn sender(&self, id: &Uuid) -> Option<mpsc::Sender<Value>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn remove(&self, id: &Uuid) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }
}

/// Keeps a session registered; dropping it deregisters the session, also
/// when the owning task unwinds.
#[derive(Debug)]
pub struct Registration {
    registry: Arc<SessionRegistry>,
    id: Uuid,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}
