use calbridge_core::{AccessToken, CalendarEvent, EventDraft, ProviderError, ProviderResult};
use reqwest::Method;

use crate::client::ApiClient;
use crate::google_event::{FromGoogle, GoogleEvent, ToGoogle};

pub async fn handle(
    client: &ApiClient,
    token: &AccessToken,
    draft: &EventDraft,
) -> ProviderResult<CalendarEvent> {
    let url = client.calendar_url(&["events"]);
    let request = client
        .request(Method::POST, url, token)
        .json(&draft.to_google());

    let created: GoogleEvent = client.send_json(request).await?;

    CalendarEvent::from_google(created)
        .map_err(|e| ProviderError::Unavailable(format!("Google returned a malformed event: {e}")))
}
