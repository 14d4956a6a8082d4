//! HTTP surface of the bridge

pub mod webhook;

use axum::{Router, routing};

use crate::SharedState;

pub use webhook::handle_webhook;

/// Builds the service router; the webhook path comes from configuration.
pub fn router(state: SharedState) -> Router {
    let traces_path = state.config.traces.url_path.clone();
    Router::new()
        .route("/", routing::get(root))
        // Every method is routed to the handler so it can answer non-POST
        // requests with 400 rather than axum's 405.
        .route(&traces_path, routing::any(webhook::handle_webhook))
        .with_state(state)
}

/// Liveness banner.
async fn root() -> &'static str {
    concat!("gitlab_trace_bridge ", env!("CARGO_PKG_VERSION"))
}
