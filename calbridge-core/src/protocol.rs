//! The JSON protocol spoken between the bridge and connected client sessions.
//!
//! Every frame is one JSON object with a `type` tag. Inbound frames decode
//! into a closed set of [`SyncCommand`]s; anything else is an error the
//! client hears about.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult, ErrorKind};
use crate::event::{CalendarEvent, EventDraft};
use crate::provider::AccessToken;

/// Commands a session may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncCommand {
    #[serde(rename = "auth", rename_all = "camelCase")]
    Authenticate { access_token: AccessToken },

    CreateEvent { event: EventDraft },

    #[serde(rename_all = "camelCase")]
    UpdateEvent { event_id: String, event: EventDraft },

    #[serde(rename_all = "camelCase")]
    DeleteEvent { event_id: String },

    #[serde(rename = "sync_calendar")]
    ResyncCalendar,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl SyncCommand {
    /// Every `type` tag this protocol understands.
    pub const TYPES: [&'static str; 5] = [
        "auth",
        "create_event",
        "update_event",
        "delete_event",
        "sync_calendar",
    ];

    /// Decode one inbound frame.
    ///
    /// Unknown tags yield `UnknownCommand`; a known tag with a bad payload
    /// (or a frame that isn't a JSON object) yields `InvalidCommand`.
    pub fn decode(text: &str) -> BridgeResult<Self> {
        let envelope: Envelope = serde_json::from_str(text)
            .map_err(|e| BridgeError::InvalidCommand(format!("Failed to parse message: {e}")))?;

        let kind = envelope
            .kind
            .ok_or_else(|| BridgeError::InvalidCommand("Message has no type".into()))?;

        if !Self::TYPES.contains(&kind.as_str()) {
            return Err(BridgeError::UnknownCommand(kind));
        }

        serde_json::from_str(text)
            .map_err(|e| BridgeError::InvalidCommand(format!("Invalid {kind} payload: {e}")))
    }

    /// The reply family used when this command fails.
    pub fn scope(&self) -> ReplyScope {
        match self {
            SyncCommand::Authenticate { .. } => ReplyScope::Auth,
            SyncCommand::CreateEvent { .. } => ReplyScope::Create,
            SyncCommand::UpdateEvent { .. } => ReplyScope::Update,
            SyncCommand::DeleteEvent { .. } => ReplyScope::Delete,
            SyncCommand::ResyncCalendar => ReplyScope::Sync,
        }
    }
}

/// Which `*_error` reply a failure maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyScope {
    Auth,
    Create,
    Update,
    Delete,
    Sync,
    /// Frames that never decoded into a command
    Protocol,
}

/// Where a broadcast change originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    /// A mutation made through the bridge by a connected session
    App,
}

/// Messages the bridge sends to sessions, either as a reply to the
/// initiating session or as a broadcast to every session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BroadcastMessage {
    Connected { message: String },

    AuthSuccess,
    AuthError { error: String, kind: ErrorKind },

    CreateSuccess { event: CalendarEvent },
    CreateError { error: String, kind: ErrorKind },
    UpdateSuccess { event: CalendarEvent },
    UpdateError { error: String, kind: ErrorKind },
    #[serde(rename_all = "camelCase")]
    DeleteSuccess { event_id: String },
    DeleteError { error: String, kind: ErrorKind },

    EventCreated { event: CalendarEvent, source: EventSource },
    EventUpdated { event: CalendarEvent, source: EventSource },
    #[serde(rename_all = "camelCase")]
    EventDeleted { event_id: String, source: EventSource },

    SyncComplete { events: Vec<CalendarEvent>, count: usize },
    SyncError { error: String, kind: ErrorKind },

    /// The provider reported a change made elsewhere; clients should resync.
    #[serde(rename = "google_calendar_changed")]
    ExternalChange { message: String },

    /// A frame that couldn't be handled as any command
    Error { error: String, kind: ErrorKind },
}

impl BroadcastMessage {
    pub fn connected() -> Self {
        BroadcastMessage::Connected {
            message: "Connected to calendar sync".to_string(),
        }
    }

    pub fn external_change() -> Self {
        BroadcastMessage::ExternalChange {
            message: "Google Calendar was updated externally".to_string(),
        }
    }

    pub fn sync_complete(events: Vec<CalendarEvent>) -> Self {
        let count = events.len();
        BroadcastMessage::SyncComplete { events, count }
    }

    /// Build the `*_error` reply for a failure in the given scope.
    pub fn error_notice(scope: ReplyScope, err: &BridgeError) -> Self {
        let error = err.to_string();
        let kind = err.kind();

        match scope {
            ReplyScope::Auth => BroadcastMessage::AuthError { error, kind },
            ReplyScope::Create => BroadcastMessage::CreateError { error, kind },
            ReplyScope::Update => BroadcastMessage::UpdateError { error, kind },
            ReplyScope::Delete => BroadcastMessage::DeleteError { error, kind },
            ReplyScope::Sync => BroadcastMessage::SyncError { error, kind },
            ReplyScope::Protocol => BroadcastMessage::Error { error, kind },
        }
    }

    /// The wire `type` tag, for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            BroadcastMessage::Connected { .. } => "connected",
            BroadcastMessage::AuthSuccess => "auth_success",
            BroadcastMessage::AuthError { .. } => "auth_error",
            BroadcastMessage::CreateSuccess { .. } => "create_success",
            BroadcastMessage::CreateError { .. } => "create_error",
            BroadcastMessage::UpdateSuccess { .. } => "update_success",
            BroadcastMessage::UpdateError { .. } => "update_error",
            BroadcastMessage::DeleteSuccess { .. } => "delete_success",
            BroadcastMessage::DeleteError { .. } => "delete_error",
            BroadcastMessage::EventCreated { .. } => "event_created",
            BroadcastMessage::EventUpdated { .. } => "event_updated",
            BroadcastMessage::EventDeleted { .. } => "event_deleted",
            BroadcastMessage::SyncComplete { .. } => "sync_complete",
            BroadcastMessage::SyncError { .. } => "sync_error",
            BroadcastMessage::ExternalChange { .. } => "google_calendar_changed",
            BroadcastMessage::Error { .. } => "error",
        }
    }
}
