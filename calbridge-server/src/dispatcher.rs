//! Per-session command handling.
//!
//! A `Dispatcher` lives for the duration of one connection and processes
//! that connection's commands one at a time, in the order received.

use std::sync::Arc;

use calbridge_core::{
    AccessToken, BridgeError, BroadcastMessage, EventDraft, EventSource, ReplyScope, SyncCommand,
};
use tracing::{debug, info, warn};

use crate::bridge::Bridge;
use crate::session::Session;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unauthenticated,
    Authenticated,
    Closed,
}

pub struct Dispatcher {
    bridge: Arc<Bridge>,
    session: Arc<Session>,
    phase: Phase,
}

impl Dispatcher {
    pub fn new(bridge: Arc<Bridge>, session: Arc<Session>) -> Self {
        Dispatcher {
            bridge,
            session,
            phase: Phase::Unauthenticated,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Decode and handle one inbound text frame.
    pub async fn handle_text(&mut self, text: &str) {
        match SyncCommand::decode(text) {
            Ok(command) => self.dispatch(command).await,
            Err(e) => {
                warn!(session_id = %self.session.id(), error = %e, "rejecting inbound message");
                self.reply(BroadcastMessage::error_notice(ReplyScope::Protocol, &e));
            }
        }
    }

    pub async fn dispatch(&mut self, command: SyncCommand) {
        if self.phase == Phase::Closed {
            return;
        }

        let scope = command.scope();
        debug!(session_id = %self.session.id(), ?scope, "dispatching command");

        match (self.phase, command) {
            (_, SyncCommand::Authenticate { access_token }) => {
                self.authenticate(access_token).await
            }
            (Phase::Unauthenticated, _) => {
                self.reply(BroadcastMessage::error_notice(
                    scope,
                    &BridgeError::Unauthenticated,
                ));
            }
            (_, SyncCommand::CreateEvent { event }) => self.create_event(event).await,
            (_, SyncCommand::UpdateEvent { event_id, event }) => {
                self.update_event(&event_id, event).await
            }
            (_, SyncCommand::DeleteEvent { event_id }) => self.delete_event(&event_id).await,
            (_, SyncCommand::ResyncCalendar) => self.resync().await,
        }
    }

    /// Leave the registry; later commands are ignored.
    pub async fn close(&mut self) {
        if self.phase == Phase::Closed {
            return;
        }
        self.phase = Phase::Closed;
        self.bridge.on_disconnect(&self.session).await;
    }

    async fn authenticate(&mut self, token: AccessToken) {
        if let Err(e) = self.bridge.authenticate(token).await {
            warn!(session_id = %self.session.id(), error = %e, "authentication failed");
            self.reply(BroadcastMessage::error_notice(ReplyScope::Auth, &e));
            return;
        }

        self.phase = Phase::Authenticated;
        info!(session_id = %self.session.id(), "session authenticated");
        self.reply(BroadcastMessage::AuthSuccess);

        // The initial sync doesn't wait on the watch call; registration is
        // best effort and a session works fine without change notifications.
        let (registered, ()) = tokio::join!(self.bridge.register_webhook(), self.resync());
        if let Err(e) = registered {
            warn!(error = %e, "continuing without a webhook channel");
        }
    }

    /// Pull for this session only; nothing is broadcast.
    async fn resync(&self) {
        let reply = match self.bridge.resync().await {
            Ok(events) => BroadcastMessage::sync_complete(events),
            Err(e) => BroadcastMessage::error_notice(ReplyScope::Sync, &e),
        };
        self.reply(reply);
    }

    async fn create_event(&self, draft: EventDraft) {
        match self.bridge.create_event(draft).await {
            Ok(event) => {
                info!(session_id = %self.session.id(), event_id = %event.id, "event created");
                self.reply(BroadcastMessage::CreateSuccess {
                    event: event.clone(),
                });
                self.broadcast(BroadcastMessage::EventCreated {
                    event,
                    source: EventSource::App,
                })
                .await;
            }
            Err(e) => self.reply(BroadcastMessage::error_notice(ReplyScope::Create, &e)),
        }
    }

    async fn update_event(&self, event_id: &str, draft: EventDraft) {
        match self.bridge.update_event(event_id, draft).await {
            Ok(event) => {
                info!(session_id = %self.session.id(), event_id, "event updated");
                self.reply(BroadcastMessage::UpdateSuccess {
                    event: event.clone(),
                });
                self.broadcast(BroadcastMessage::EventUpdated {
                    event,
                    source: EventSource::App,
                })
                .await;
            }
            Err(e) => self.reply(BroadcastMessage::error_notice(ReplyScope::Update, &e)),
        }
    }

    async fn delete_event(&self, event_id: &str) {
        match self.bridge.delete_event(event_id).await {
            Ok(()) => {
                info!(session_id = %self.session.id(), event_id, "event deleted");
                self.reply(BroadcastMessage::DeleteSuccess {
                    event_id: event_id.to_string(),
                });
                self.broadcast(BroadcastMessage::EventDeleted {
                    event_id: event_id.to_string(),
                    source: EventSource::App,
                })
                .await;
            }
            Err(e) => self.reply(BroadcastMessage::error_notice(ReplyScope::Delete, &e)),
        }
    }

    /// Every other session learns about the change; this one got its reply.
    async fn broadcast(&self, message: BroadcastMessage) {
        self.bridge
            .registry()
            .broadcast_except(self.session.id(), &message)
            .await;
    }

    fn reply(&self, message: BroadcastMessage) {
        let message_type = message.type_name();
        if self.session.deliver(message).is_err() {
            debug!(session_id = %self.session.id(), message_type, "session gone; reply dropped");
        }
    }
}
