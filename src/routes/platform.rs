//! Platform data routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::platform;
use crate::state::AppState;

/// Create platform data routes
pub fn platform_routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(platform::list_events))
        .route("/api/stats", get(platform::get_stats))
        .route("/api/register", post(platform::register))
        .route(
            "/api/profile",
            get(platform::get_profile).patch(platform::update_profile),
        )
}
