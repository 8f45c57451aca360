pub mod status;
pub mod webhook;
pub mod ws;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bridge::AppState;

/// Build the full HTTP surface: the session socket, the provider webhook
/// and the status probe.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(ws::router())
        .merge(webhook::router())
        .merge(status::router())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
