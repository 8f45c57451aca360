//! Status endpoint

use axum::{Json, Router, extract::State, routing::get};

use crate::bridge::{AppState, BridgeStatus};

pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(status))
}

/// GET /status - Connected sessions, credential and webhook channel
async fn status(State(state): State<AppState>) -> Json<BridgeStatus> {
    Json(state.status().await)
}
