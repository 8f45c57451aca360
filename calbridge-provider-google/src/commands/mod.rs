//! One module per Calendar API operation the bridge uses.

pub mod create_event;
pub mod delete_event;
pub mod list_events;
pub mod update_event;
pub mod verify;
pub mod watch;
