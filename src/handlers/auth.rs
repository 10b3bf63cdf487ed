//! Wallet authentication HTTP handlers
//!
//! The challenge lives in a signed, HttpOnly cookie: the server keeps no
//! table of outstanding challenges, and page scripts can neither read nor
//! forge it. Writing the cookie supersedes any earlier challenge for the
//! same client, so at most one nonce is live per client at a time.

use axum::extract::{Host, State};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::auth::Challenge;
use crate::error::ApiError;
use crate::models::{
    ChallengeResponse, PrepareRequest, PrepareResponse, VerifyRequest, VerifyResponse,
};
use crate::state::AppState;

/// Challenge cookie name. Holds the encoded nonce for the login round trip.
pub const CHALLENGE_COOKIE: &str = "lacra_challenge";

/// Verified-address cookie name. A convenience marker that the address
/// recently proved key control; not a data-store credential.
pub const VERIFIED_COOKIE: &str = "lacra_verified_address";

/// GET /api/auth/challenge - Issue a fresh login challenge
pub async fn issue_challenge(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Json<ChallengeResponse>), ApiError> {
    let challenge = state.auth.issue_challenge()?;

    let jar = jar.add(baked_cookie(
        CHALLENGE_COOKIE,
        challenge.encode(),
        state.auth.challenge_ttl_seconds(),
    ));

    Ok((
        jar,
        Json(ChallengeResponse {
            nonce: challenge.nonce,
        }),
    ))
}

/// POST /api/auth/prepare - Build the sign-in message for a claimed address
///
/// Always refreshes the challenge cookie: message preparation and challenge
/// issuance share one lifecycle.
pub async fn prepare_message(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    WithRejection(Json(req), _): WithRejection<Json<PrepareRequest>, ApiError>,
) -> Result<(SignedCookieJar, Json<PrepareResponse>), ApiError> {
    req.validate()?;

    let (message, challenge) = state.auth.prepare_message(&req.address, req.chain_id)?;

    let jar = jar.add(baked_cookie(
        CHALLENGE_COOKIE,
        challenge.encode(),
        state.auth.challenge_ttl_seconds(),
    ));

    Ok((
        jar,
        Json(PrepareResponse {
            message: message.to_string(),
        }),
    ))
}

/// POST /api/auth/verify - Verify a signed message
///
/// On success the challenge cookie is cleared (the nonce is consumed) and the
/// verified-address cookie is set. On failure nothing is consumed, so the
/// same challenge may be retried with a corrected signature until it expires.
pub async fn verify_signature(
    State(state): State<AppState>,
    Host(host): Host,
    jar: SignedCookieJar,
    WithRejection(Json(req), _): WithRejection<Json<VerifyRequest>, ApiError>,
) -> Result<(SignedCookieJar, Json<VerifyResponse>), ApiError> {
    req.validate()?;

    let stored = jar
        .get(CHALLENGE_COOKIE)
        .and_then(|cookie| Challenge::decode(cookie.value()));

    match state
        .auth
        .verify(&req.message, &req.signature, &host, stored.as_ref())
    {
        Ok(address) => {
            tracing::info!(address = %address, "Wallet login verified");

            let jar = jar
                .add(baked_cookie(
                    VERIFIED_COOKIE,
                    address.clone(),
                    state.auth.verified_ttl_seconds(),
                ))
                .remove(removal_cookie(CHALLENGE_COOKIE));

            Ok((jar, Json(VerifyResponse { ok: true, address })))
        }
        Err(err) => {
            // The specific reason stays in the log; the response is opaque
            if err.is_client_error() {
                tracing::warn!(reason = %err, host = %host, "Wallet login rejected");
            }
            Err(err.into())
        }
    }
}

/// Build a cookie with the hardened attributes every auth cookie carries.
fn baked_cookie(name: &'static str, value: String, max_age_seconds: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(max_age_seconds));
    cookie
}

/// Expired cookie used to clear a consumed challenge (Max-Age=0).
fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::from(name);
    cookie.set_path("/");
    cookie
}
