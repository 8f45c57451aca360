//! Forward time window used for a resync.

use chrono::{DateTime, Months, Utc};

/// How far ahead a resync looks.
pub const SYNC_WINDOW_MONTHS: u32 = 2;

/// Maximum number of events a single resync returns.
pub const SYNC_MAX_EVENTS: u32 = 250;

/// Time window for listing events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub max_results: u32,
}

impl SyncWindow {
    /// `now` through `now + SYNC_WINDOW_MONTHS`, capped at `SYNC_MAX_EVENTS`.
    pub fn forward_from(now: DateTime<Utc>) -> Self {
        let to = now
            .checked_add_months(Months::new(SYNC_WINDOW_MONTHS))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        SyncWindow {
            from: now,
            to,
            max_results: SYNC_MAX_EVENTS,
        }
    }

    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339()
    }
}

impl Default for SyncWindow {
    fn default() -> Self {
        Self::forward_from(Utc::now())
    }
}
