use calbridge_core::{AccessToken, CalendarEvent, EventDraft, ProviderError, ProviderResult};
use reqwest::Method;

use crate::client::ApiClient;
use crate::google_event::{FromGoogle, GoogleEvent, ToGoogle};

/// Replace the event's fields with the draft (`events.update`).
pub async fn handle(
    client: &ApiClient,
    token: &AccessToken,
    event_id: &str,
    draft: &EventDraft,
) -> ProviderResult<CalendarEvent> {
    let url = client.calendar_url(&["events", event_id]);
    let request = client
        .request(Method::PUT, url, token)
        .json(&draft.to_google());

    let updated: GoogleEvent = client.send_json(request).await?;

    CalendarEvent::from_google(updated)
        .map_err(|e| ProviderError::Unavailable(format!("Google returned a malformed event: {e}")))
}
