//! Message fan-out to connected sessions.

use std::collections::HashMap;
use std::sync::Arc;

use calbridge_core::BroadcastMessage;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::session::{Session, SessionId};

/// The set of connected sessions.
///
/// `add`, `remove` and broadcasts take the same lock, so two broadcasts
/// never interleave their writes into one session's channel.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, session: Arc<Session>) {
        self.sessions.lock().await.insert(session.id(), session);
    }

    pub async fn remove(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.lock().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, id: SessionId) -> bool {
        self.sessions.lock().await.contains_key(&id)
    }

    /// Deliver to every session. Returns how many sessions received it.
    pub async fn broadcast(&self, message: &BroadcastMessage) -> usize {
        self.fan_out(None, message).await
    }

    /// Deliver to every session except `excluded` (usually the initiator,
    /// which already got its own reply).
    pub async fn broadcast_except(&self, excluded: SessionId, message: &BroadcastMessage) -> usize {
        self.fan_out(Some(excluded), message).await
    }

    /// Sessions that fail delivery are dropped; the rest still receive.
    async fn fan_out(&self, excluded: Option<SessionId>, message: &BroadcastMessage) -> usize {
        let mut sessions = self.sessions.lock().await;
        let mut delivered = 0;
        let mut dead = Vec::new();

        for (id, session) in sessions.iter() {
            if Some(*id) == excluded {
                continue;
            }

            match session.deliver(message.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(session_id = %id, error = %e, "dropping session after failed delivery");
                    dead.push(*id);
                }
            }
        }

        for id in &dead {
            if let Some(session) = sessions.remove(id) {
                session.mark_closed();
            }
        }

        debug!(
            message_type = message.type_name(),
            delivered,
            dropped = dead.len(),
            "broadcast"
        );

        delivered
    }
}
