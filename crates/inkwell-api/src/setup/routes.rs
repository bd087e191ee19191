//! Route configuration and setup

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Webhook envelopes are small JSON; anything bigger is noise.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Setup all application routes
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/webhook/{secret}", post(handlers::webhook::receive_update))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
