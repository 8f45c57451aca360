use calbridge_core::{AccessToken, ProviderResult};
use reqwest::Method;

use crate::client::ApiClient;

/// Fetch the primary calendar resource; succeeds only for a usable token.
pub async fn handle(client: &ApiClient, token: &AccessToken) -> ProviderResult<()> {
    let url = client.calendar_url(&[]);
    client.send(client.request(Method::GET, url, token)).await?;

    Ok(())
}
