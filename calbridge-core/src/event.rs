//! Provider-neutral event types.
//!
//! `CalendarEvent` is what the bridge hands to clients: a projection of
//! provider state, refreshed on demand and never stored locally.
//! `EventDraft` is what clients send when creating or updating an event.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Provider-assigned id
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,

    /// Link to the event in the provider's own UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    /// Last modification timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl CalendarEvent {
    /// Instant used to order events by start time.
    pub fn start_key(&self) -> DateTime<Utc> {
        self.start.instant()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

/// Start or end of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    /// A timed event: an instant with its offset, plus the IANA zone it was scheduled in
    Timed {
        #[serde(rename = "dateTime")]
        date_time: DateTime<FixedOffset>,
        #[serde(rename = "timeZone", default, skip_serializing_if = "Option::is_none")]
        time_zone: Option<String>,
    },
    /// An all-day event
    AllDay { date: NaiveDate },
}

impl EventTime {
    /// All-day dates are treated as starting at midnight UTC.
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            EventTime::Timed { date_time, .. } => date_time.with_timezone(&Utc),
            EventTime::AllDay { date } => date.and_time(NaiveTime::MIN).and_utc(),
        }
    }
}

/// Event payload sent by a client for create/update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date_time: DraftTime,
    pub end_date_time: DraftTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// IANA zone for floating date-times (e.g. "Europe/Berlin")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDraft {
    /// Fill in `time_zone` when the client didn't send one.
    pub fn with_default_time_zone(mut self, time_zone: &str) -> Self {
        if self.time_zone.as_deref().is_none_or(str::is_empty) {
            self.time_zone = Some(time_zone.to_string());
        }
        self
    }
}

/// A client-supplied date-time: either carries its own offset, or is a
/// wall-clock time to be read in the draft's time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DraftTime {
    Zoned(DateTime<FixedOffset>),
    Floating(NaiveDateTime),
}

const FLOATING_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

impl FromStr for DraftTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(DraftTime::Zoned(dt));
        }

        FLOATING_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(DraftTime::Floating)
            .ok_or_else(|| {
                format!("Invalid date-time '{s}'. Expected YYYY-MM-DDTHH:MM[:SS] with optional offset")
            })
    }
}

impl TryFrom<String> for DraftTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for DraftTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftTime::Zoned(dt) => write!(f, "{}", dt.to_rfc3339()),
            DraftTime::Floating(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl From<DraftTime> for String {
    fn from(value: DraftTime) -> Self {
        value.to_string()
    }
}
