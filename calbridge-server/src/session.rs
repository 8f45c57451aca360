//! A connected client session.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use calbridge_core::BroadcastMessage;
use tokio::sync::mpsc;
use uuid::Uuid;

pub type SessionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Open,
    /// The client is going away; nothing more is delivered.
    Closing,
    Closed,
}

impl Liveness {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Liveness::Open,
            1 => Liveness::Closing,
            _ => Liveness::Closed,
        }
    }
}

/// Returned when a message can't be handed to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClosed(pub SessionId);

impl fmt::Display for SessionClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session {} is closed", self.0)
    }
}

impl std::error::Error for SessionClosed {}

/// Outbound messages a session may have queued before it counts as dead.
pub const OUTBOUND_CAPACITY: usize = 64;

/// Handle to one client connection.
///
/// Outbound messages go through a bounded channel drained by the
/// connection's writer task, so delivery never waits on the socket.
pub struct Session {
    id: SessionId,
    liveness: AtomicU8,
    tx: mpsc::Sender<BroadcastMessage>,
}

impl Session {
    pub fn new() -> (Arc<Session>, mpsc::Receiver<BroadcastMessage>) {
        Self::with_capacity(OUTBOUND_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Arc<Session>, mpsc::Receiver<BroadcastMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        let session = Session {
            id: Uuid::new_v4(),
            liveness: AtomicU8::new(Liveness::Open as u8),
            tx,
        };
        (Arc::new(session), rx)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn liveness(&self) -> Liveness {
        Liveness::from_u8(self.liveness.load(Ordering::Acquire))
    }

    pub fn is_open(&self) -> bool {
        self.liveness() == Liveness::Open
    }

    /// Open -> Closing. No-op once closing or closed.
    pub fn begin_close(&self) {
        let _ = self.liveness.compare_exchange(
            Liveness::Open as u8,
            Liveness::Closing as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    pub fn mark_closed(&self) {
        self.liveness.store(Liveness::Closed as u8, Ordering::Release);
    }

    /// Queue a message for the client. Fails without sending if the session
    /// is not open. A dead channel, or a full one (the client stopped
    /// reading), marks the session closed.
    pub fn deliver(&self, message: BroadcastMessage) -> Result<(), SessionClosed> {
        if !self.is_open() {
            return Err(SessionClosed(self.id));
        }

        self.tx.try_send(message).map_err(|_| {
            self.mark_closed();
            SessionClosed(self.id)
        })
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("liveness", &self.liveness())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_while_open() {
        let (session, mut rx) = Session::new();
        session.deliver(BroadcastMessage::AuthSuccess).unwrap();
        assert_eq!(rx.try_recv().unwrap(), BroadcastMessage::AuthSuccess);
    }

    #[test]
    fn test_dropped_receiver_closes_session() {
        let (session, rx) = Session::new();
        drop(rx);

        assert_eq!(
            session.deliver(BroadcastMessage::AuthSuccess),
            Err(SessionClosed(session.id()))
        );
        assert_eq!(session.liveness(), Liveness::Closed);
    }

    #[test]
    fn test_full_queue_closes_session() {
        let (session, mut rx) = Session::with_capacity(2);
        session.deliver(BroadcastMessage::AuthSuccess).unwrap();
        session.deliver(BroadcastMessage::AuthSuccess).unwrap();

        assert!(session.deliver(BroadcastMessage::AuthSuccess).is_err());
        assert_eq!(session.liveness(), Liveness::Closed);

        // Draining afterwards doesn't reopen it
        rx.try_recv().unwrap();
        assert!(session.deliver(BroadcastMessage::AuthSuccess).is_err());
    }

    #[test]
    fn test_closing_session_gets_nothing() {
        let (session, mut rx) = Session::new();
        session.begin_close();

        assert!(session.deliver(BroadcastMessage::AuthSuccess).is_err());
        assert!(rx.try_recv().is_err());
        assert_eq!(session.liveness(), Liveness::Closing);

        session.mark_closed();
        session.begin_close();
        assert_eq!(session.liveness(), Liveness::Closed);
    }
}
