//! Read-only service status.

use std::sync::Arc;

use axum::{extract::State, Json};
use inkwell_core::models::ServiceStats;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Aggregate counts: records, active records, users, total views. No side
/// effects.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ServiceStats>, HttpAppError> {
    let stats = state.lifecycle.stats().await?;
    Ok(Json(stats))
}
