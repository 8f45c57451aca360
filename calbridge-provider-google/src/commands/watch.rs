use calbridge_core::{AccessToken, ChannelRequest, ProviderResult, WebhookChannel};
use chrono::DateTime;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;

#[derive(Debug, Serialize)]
struct WatchRequest<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    address: &'a str,
    /// Milliseconds since the Unix epoch
    expiration: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WatchResponse {
    id: String,
    #[serde(default)]
    resource_id: Option<String>,
    /// Google encodes int64 as a string
    #[serde(default)]
    expiration: Option<String>,
}

/// Subscribe `request.address` to changes on the primary calendar's events.
pub async fn handle(
    client: &ApiClient,
    token: &AccessToken,
    request: &ChannelRequest,
) -> ProviderResult<WebhookChannel> {
    let url = client.calendar_url(&["events", "watch"]);
    let body = WatchRequest {
        id: &request.id,
        kind: "web_hook",
        address: &request.address,
        expiration: request.expiration.timestamp_millis(),
    };

    let response: WatchResponse = client
        .send_json(client.request(Method::POST, url, token).json(&body))
        .await?;

    // Google may shorten the requested lifetime
    let expiration = response
        .expiration
        .as_deref()
        .and_then(|ms| ms.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(request.expiration);

    Ok(WebhookChannel {
        id: response.id,
        resource_id: response.resource_id,
        address: request.address.clone(),
        expiration,
    })
}
