//! Inbound change notifications from Google Calendar

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use tracing::info;

use crate::bridge::AppState;

const CHANNEL_ID_HEADER: &str = "x-goog-channel-id";
const RESOURCE_STATE_HEADER: &str = "x-goog-resource-state";

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook/google-calendar", post(notify))
}

/// POST /webhook/google-calendar - Resync and tell every session to pull.
///
/// Always acknowledged with 200 so the provider doesn't back off; a failed
/// resync is logged and nothing is broadcast.
async fn notify(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string()
    };

    info!(
        channel_id = %header(CHANNEL_ID_HEADER),
        resource_state = %header(RESOURCE_STATE_HEADER),
        "calendar change notification"
    );

    state.on_external_change().await;

    (StatusCode::OK, "OK")
}
