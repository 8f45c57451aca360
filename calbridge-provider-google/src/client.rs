//! Thin authenticated HTTP client for the Google Calendar v3 API.

use calbridge_core::{AccessToken, ProviderError, ProviderResult};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google's alias for the authenticated user's main calendar
pub const PRIMARY_CALENDAR_ID: &str = "primary";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(api_base: &str) -> Result<Self, String> {
        let base = Url::parse(api_base).map_err(|e| format!("Invalid API base '{api_base}': {e}"))?;

        if base.cannot_be_a_base() {
            return Err(format!("Invalid API base '{api_base}': not a hierarchical URL"));
        }

        Ok(ApiClient {
            http: reqwest::Client::new(),
            base,
        })
    }

    /// `{base}/calendars/primary/{segments...}`, each segment percent-encoded.
    pub fn calendar_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`: the base is always hierarchical.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("calendars")
                .push(PRIMARY_CALENDAR_ID)
                .extend(segments);
        }
        url
    }

    pub fn request(&self, method: Method, url: Url, token: &AccessToken) -> RequestBuilder {
        self.http.request(method, url).bearer_auth(token.secret())
    }

    /// Send a request, classifying failures.
    ///
    /// 4xx responses are rejections; transport errors and 5xx responses mean
    /// the provider is unavailable.
    pub async fn send(&self, request: RequestBuilder) -> ProviderResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = google_error_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "Unknown error".to_string());

        if status.is_client_error() {
            Err(ProviderError::Rejected {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(ProviderError::Unavailable(format!("{status}: {message}")))
        }
    }

    /// Send a request and decode the JSON response body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ProviderResult<T> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("Failed to parse response: {e}")))
    }
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

/// Extract `error.message` from a Google API error body.
fn google_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<GoogleErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
}
