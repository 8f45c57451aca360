//! Core types for calbridge.
//!
//! This crate provides the types shared by the bridge server and calendar providers:
//! - `CalendarEvent` / `EventDraft` for events in both directions
//! - `protocol` for the JSON messages exchanged with client sessions
//! - `provider` for the `CalendarProvider` trait adapters implement
//! - `error` for the failure taxonomy

pub mod error;
pub mod event;
pub mod protocol;
pub mod provider;
pub mod window;

pub use error::{BridgeError, BridgeResult, ErrorKind, ProviderError, ProviderResult};
pub use event::{CalendarEvent, DraftTime, EventDraft, EventStatus, EventTime};
pub use protocol::{BroadcastMessage, EventSource, ReplyScope, SyncCommand};
pub use provider::{AccessToken, CalendarProvider, ChannelRequest, WebhookChannel};
pub use window::SyncWindow;
