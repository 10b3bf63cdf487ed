//! Health check handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
    pub version: String,
}

/// GET /health - Service and store reachability
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_status = match state.store.health().await {
        Ok(()) => "reachable".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let status = if store_status == "reachable" {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        store: store_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
