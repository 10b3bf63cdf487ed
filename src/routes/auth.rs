//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{auth, identity};
use crate::state::AppState;

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/challenge", get(auth::issue_challenge))
        .route("/api/auth/prepare", post(auth::prepare_message))
        .route("/api/auth/verify", post(auth::verify_signature))
        .route("/api/auth/login", get(identity::login_redirect))
        .route("/api/auth/callback", get(identity::login_callback))
}
