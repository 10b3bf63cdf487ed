//! Centralized API error handling
//!
//! Unified error type for API responses with HTTP status code mapping and
//! JSON error bodies. Verification failures deliberately collapse to one
//! generic response so the API does not act as an oracle for attackers; the
//! specific reason is logged server-side only.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Signature verification failed")]
    VerificationFailed,

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Data store error: {0}")]
    StoreError(String),

    #[error("Identity provider error: {0}")]
    IdentityProviderError(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::VerificationFailed => "VERIFICATION_FAILED",
            ApiError::TooManyRequests => "TOO_MANY_REQUESTS",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::StoreError(_) => "STORE_ERROR",
            ApiError::IdentityProviderError(_) => "IDENTITY_PROVIDER_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::VerificationFailed => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::IdentityProviderError(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        // Log server errors
        match &self {
            ApiError::InternalError(_)
            | ApiError::StoreError(_)
            | ApiError::IdentityProviderError(_) => {
                tracing::error!(error = %message, code = %error_code, "Server error occurred");
            }
            _ => {
                tracing::debug!(error = %message, code = %error_code, "Client error occurred");
            }
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Convenience conversions from common error types

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // User-correctable input problems keep their message
            AuthError::InvalidWalletAddress(_) | AuthError::InvalidChainId(_) => {
                ApiError::BadRequest(err.to_string())
            }
            // All verification failures collapse to one opaque response
            AuthError::MalformedMessage(_)
            | AuthError::MissingChallenge
            | AuthError::BadSignature
            | AuthError::DomainMismatch
            | AuthError::NonceInvalidOrExpired => ApiError::VerificationFailed,
            AuthError::RngFailure(e) => ApiError::InternalError(e),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::StoreError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

// A missing or type-malformed body field must surface as the same 400 JSON
// envelope as every other input problem, not axum's default 422 plain text
impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApiError::BadRequest("test".to_string()).error_code(),
            "BAD_REQUEST"
        );
        assert_eq!(
            ApiError::VerificationFailed.error_code(),
            "VERIFICATION_FAILED"
        );
        assert_eq!(ApiError::TooManyRequests.error_code(), "TOO_MANY_REQUESTS");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::VerificationFailed.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InternalError("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_verification_failures_are_opaque() {
        // None of the specific verification failure reasons may leak into
        // the response mapping
        for err in [
            AuthError::MalformedMessage("bad header".to_string()),
            AuthError::MissingChallenge,
            AuthError::BadSignature,
            AuthError::DomainMismatch,
            AuthError::NonceInvalidOrExpired,
        ] {
            let api: ApiError = err.into();
            assert!(matches!(api, ApiError::VerificationFailed));
            assert_eq!(api.to_string(), "Signature verification failed");
        }
    }

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let api: ApiError = AuthError::InvalidWalletAddress("0x12".to_string()).into();
        assert!(matches!(api, ApiError::BadRequest(_)));

        let api: ApiError = AuthError::InvalidChainId(0).into();
        assert!(matches!(api, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let err = ApiError::Unauthorized("No verified wallet for this client".to_string());
        assert_eq!(err.error_code(), "UNAUTHORIZED");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_rng_failure_is_internal() {
        let api: ApiError = AuthError::RngFailure("entropy pool".to_string()).into();
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
