use calbridge_core::{AccessToken, CalendarEvent, EventStatus, ProviderResult, SyncWindow};
use reqwest::Method;

use crate::client::ApiClient;
use crate::google_event::{FromGoogle, GoogleEventList};

pub async fn handle(
    client: &ApiClient,
    token: &AccessToken,
    window: &SyncWindow,
) -> ProviderResult<Vec<CalendarEvent>> {
    let url = client.calendar_url(&["events"]);
    let max_results = window.max_results.to_string();

    let request = client.request(Method::GET, url, token).query(&[
        ("timeMin", window.from_rfc3339().as_str()),
        ("timeMax", window.to_rfc3339().as_str()),
        ("maxResults", max_results.as_str()),
        // Expand recurring events so results can be ordered by start time
        ("singleEvents", "true"),
        ("orderBy", "startTime"),
    ]);

    let list: GoogleEventList = client.send_json(request).await?;

    let events = list
        .items
        .into_iter()
        .filter_map(|item| match CalendarEvent::from_google(item) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed event from Google");
                None
            }
        })
        .filter(|event| event.status != Some(EventStatus::Cancelled))
        .collect();

    Ok(events)
}
