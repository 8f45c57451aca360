use calbridge_core::{DraftTime, EventDraft};

use super::{GoogleEvent, GoogleEventDateTime};

pub trait ToGoogle {
    fn to_google(&self) -> GoogleEvent;
}

impl ToGoogle for EventDraft {
    fn to_google(&self) -> GoogleEvent {
        GoogleEvent {
            // Google assigns ids; the id of an update goes in the URL
            id: None,
            summary: Some(self.title.clone()),
            description: self.description.clone(),
            start: Some(draft_time_to_google(&self.start_date_time, self.time_zone.as_deref())),
            end: Some(draft_time_to_google(&self.end_date_time, self.time_zone.as_deref())),
            location: self.location.clone(),
            ..Default::default()
        }
    }
}

fn draft_time_to_google(time: &DraftTime, time_zone: Option<&str>) -> GoogleEventDateTime {
    GoogleEventDateTime {
        date_time: Some(time.to_string()),
        date: None,
        time_zone: time_zone.filter(|tz| !tz.is_empty()).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_draft_to_google_body() {
        let draft: EventDraft = serde_json::from_value(json!({
            "title": "Standup",
            "description": "Daily sync",
            "startDateTime": "2025-01-10T09:00:00",
            "endDateTime": "2025-01-10T09:30:00",
            "location": "Room 4",
            "timeZone": "Europe/Berlin"
        }))
        .unwrap();

        assert_eq!(
            serde_json::to_value(draft.to_google()).unwrap(),
            json!({
                "summary": "Standup",
                "description": "Daily sync",
                "start": {"dateTime": "2025-01-10T09:00:00", "timeZone": "Europe/Berlin"},
                "end": {"dateTime": "2025-01-10T09:30:00", "timeZone": "Europe/Berlin"},
                "location": "Room 4"
            })
        );
    }

    #[test]
    fn test_zoned_draft_keeps_offset() {
        let draft: EventDraft = serde_json::from_value(json!({
            "title": "Call",
            "startDateTime": "2025-01-10T09:00:00+02:00",
            "endDateTime": "2025-01-10T10:00:00+02:00"
        }))
        .unwrap();

        let body = serde_json::to_value(draft.to_google()).unwrap();
        assert_eq!(body["start"], json!({"dateTime": "2025-01-10T09:00:00+02:00"}));
        assert!(body.get("description").is_none());
    }
}
