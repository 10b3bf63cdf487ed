//! Identity provider HTTP handlers
//!
//! Thin glue over the redirect-based login/callback contract with the hosted
//! identity provider.

use axum::extract::{OriginalUri, Query, State};
use axum::response::Redirect;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::identity::ProviderSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub return_url: Option<String>,
}

/// GET /api/auth/login - Redirect the browser to the identity provider
pub async fn login_redirect(
    State(state): State<AppState>,
    Query(params): Query<LoginParams>,
) -> Redirect {
    let return_url = params
        .return_url
        .unwrap_or_else(|| format!("{}/auth/callback", state.auth.site_url()));

    Redirect::temporary(&state.identity.login_redirect_url(&return_url))
}

/// GET /api/auth/callback - Exchange the provider's code for a session
pub async fn login_callback(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<ProviderSession>, ApiError> {
    let session = state
        .identity
        .exchange_code_for_session(&uri.to_string())
        .await
        .map_err(|e| ApiError::IdentityProviderError(e.to_string()))?;

    Ok(Json(session))
}
