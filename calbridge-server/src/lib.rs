//! Real-time bridge between WebSocket client sessions and a Google calendar.
//!
//! Sessions connect on `/ws`, authenticate with an access token and then
//! create, update and delete events through the bridge. Every successful
//! mutation is pushed to the other connected sessions, and changes made
//! elsewhere arrive through the provider webhook on
//! `/webhook/google-calendar`.

pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod logging;
pub mod registry;
pub mod routes;
pub mod session;
pub mod singleton;

#[cfg(test)]
mod test_support;

pub use bridge::{AppState, Bridge, BridgeSettings, BridgeStatus};
pub use crate::config::{LogFormat, ServerConfig};
