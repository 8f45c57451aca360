use calbridge_core::{CalendarEvent, EventStatus, EventTime};
use chrono::DateTime;

use super::{GoogleEvent, GoogleEventDateTime};

pub trait FromGoogle {
    fn from_google(event: GoogleEvent) -> Result<Self, String>
    where
        Self: Sized;
}

impl FromGoogle for CalendarEvent {
    fn from_google(event: GoogleEvent) -> Result<Self, String> {
        let id = event
            .id
            .filter(|id| !id.is_empty())
            .ok_or("Event has no id")?;

        let start = event
            .start
            .as_ref()
            .ok_or("Event has no start time")
            .and_then(|t| google_to_event_time(t).ok_or("Event has no start time"))?;

        let end = event
            .end
            .as_ref()
            .ok_or("Event has no end time")
            .and_then(|t| google_to_event_time(t).ok_or("Event has no end time"))?;

        let status = match event.status.as_deref() {
            Some("confirmed") => Some(EventStatus::Confirmed),
            Some("tentative") => Some(EventStatus::Tentative),
            Some("cancelled") => Some(EventStatus::Cancelled),
            _ => None,
        };

        Ok(CalendarEvent {
            id,
            title: event
                .summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "(No title)".to_string()),
            description: event.description.filter(|s| !s.is_empty()),
            location: event.location.filter(|s| !s.is_empty()),
            start,
            end,
            html_link: event.html_link,
            status,
            updated: event.updated,
        })
    }
}

fn google_to_event_time(time: &GoogleEventDateTime) -> Option<EventTime> {
    if let Some(dt) = time.date_time.as_deref() {
        let date_time = DateTime::parse_from_rfc3339(dt).ok()?;
        return Some(EventTime::Timed {
            date_time,
            time_zone: time.time_zone.clone().filter(|tz| !tz.is_empty()),
        });
    }

    time.date.map(|date| EventTime::AllDay { date })
}
