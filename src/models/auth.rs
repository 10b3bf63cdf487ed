//! Wallet-login request/response DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Response containing a freshly issued challenge nonce
#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub nonce: String,
}

/// Request to prepare a sign-in message for a claimed address
#[derive(Debug, Deserialize, Validate)]
pub struct PrepareRequest {
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,

    #[serde(rename = "chainId")]
    pub chain_id: i64,
}

/// Response carrying the canonical sign-in text the wallet should sign
#[derive(Debug, Serialize)]
pub struct PrepareResponse {
    pub message: String,
}

/// Request to verify a signed message
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,

    #[validate(length(min = 1, message = "signature is required"))]
    pub signature: String,
}

/// Successful verification response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub ok: bool,
    /// Recovered signer address, lowercased
    pub address: String,
}

/// Request to register interest in an event
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "event_id is required"))]
    pub event_id: String,

    #[validate(email(message = "valid email is required"))]
    pub email: String,
}

/// Request to update the caller's profile
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub display_name: Option<String>,
}
