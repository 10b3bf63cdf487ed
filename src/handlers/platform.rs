//! Platform data HTTP handlers
//!
//! Pass-through reads and writes against the hosted data store for the
//! marketing pages (events, stats, registrations, profiles). No business
//! logic lives here; row-level access is the store's concern.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::SignedCookieJar;
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};
use validator::Validate;

use super::auth::VERIFIED_COOKIE;
use crate::error::ApiError;
use crate::models::{ProfileUpdateRequest, RegisterRequest};
use crate::state::AppState;

/// GET /api/events - Upcoming events
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let rows = state.store.select("events", &[]).await?;
    Ok(Json(rows))
}

/// GET /api/stats - Platform statistics
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let rows = state.store.select("event_stats", &[]).await?;
    Ok(Json(rows))
}

/// POST /api/register - Register interest in an event
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<Json<Value>, ApiError> {
    req.validate()?;

    let record = state
        .store
        .insert(
            "registrations",
            &json!({
                "event_id": req.event_id,
                "email": req.email,
            }),
        )
        .await?;

    Ok(Json(record))
}

/// GET /api/profile - Profile row for the verified wallet
pub async fn get_profile(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Json<Option<Value>>, ApiError> {
    let address = verified_address(&jar)?;

    let mut rows = state
        .store
        .select("profiles", &[("wallet_address", &address)])
        .await?;

    Ok(Json(rows.pop()))
}

/// PATCH /api/profile - Update the verified wallet's profile
pub async fn update_profile(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    WithRejection(Json(req), _): WithRejection<Json<ProfileUpdateRequest>, ApiError>,
) -> Result<Json<Value>, ApiError> {
    let address = verified_address(&jar)?;

    state
        .store
        .update(
            "profiles",
            &[("wallet_address", &address)],
            &json!({ "display_name": req.display_name }),
        )
        .await?;

    Ok(Json(json!({ "ok": true })))
}

/// The lowercased address from the verified-address cookie, if present.
/// Absence means the client never completed a wallet login, a 401.
fn verified_address(jar: &SignedCookieJar) -> Result<String, ApiError> {
    jar.get(VERIFIED_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("No verified wallet for this client".to_string()))
}
