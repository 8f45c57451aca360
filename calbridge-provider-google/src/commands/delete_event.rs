use calbridge_core::{AccessToken, ProviderError, ProviderResult};
use reqwest::Method;

use crate::client::ApiClient;

pub async fn handle(client: &ApiClient, token: &AccessToken, event_id: &str) -> ProviderResult<()> {
    let url = client.calendar_url(&["events", event_id]);

    match client.send(client.request(Method::DELETE, url, token)).await {
        Ok(_) => Ok(()),
        // Already deleted
        Err(ProviderError::Rejected { status: 410, .. }) => Ok(()),
        Err(e) => Err(e),
    }
}
