//! Authentication service
//!
//! Core business logic for the wallet challenge-response login flow:
//! challenge issuance, sign-in message construction, and signature
//! verification. Challenge storage is the caller's concern (a signed cookie
//! in this server); the service itself holds no per-client state.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::RngCore;
use thiserror::Error;

use crate::config::Config;

use super::crypto::{self, CryptoError};
use super::message::SignInMessage;

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid wallet address: {0}")]
    InvalidWalletAddress(String),

    #[error("Invalid chain id: {0}")]
    InvalidChainId(i64),

    #[error("Malformed sign-in message: {0}")]
    MalformedMessage(String),

    #[error("No outstanding challenge for this client")]
    MissingChallenge,

    #[error("Signature does not match the claimed address")]
    BadSignature,

    #[error("Message domain does not match the serving host")]
    DomainMismatch,

    #[error("Challenge nonce is invalid or expired")]
    NonceInvalidOrExpired,

    #[error("Randomness source failure: {0}")]
    RngFailure(String),
}

impl From<CryptoError> for AuthError {
    fn from(_: CryptoError) -> Self {
        AuthError::BadSignature
    }
}

impl AuthError {
    /// Whether this failure is the client's fault (HTTP 400) as opposed to an
    /// internal one (HTTP 500).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AuthError::RngFailure(_))
    }
}

/// A single-use, time-bounded login challenge.
///
/// Lives only in the signed challenge cookie; the server keeps no table of
/// outstanding challenges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Challenge {
    /// Serialize for the cookie value: `nonce.issued_ms.expires_ms`.
    pub fn encode(&self) -> String {
        format!(
            "{}.{}.{}",
            self.nonce,
            self.issued_at.timestamp_millis(),
            self.expires_at.timestamp_millis()
        )
    }

    /// Decode a cookie value produced by [`Challenge::encode`].
    ///
    /// The cookie is signed, so a value that decodes is one this server
    /// wrote; anything that does not decode is treated as no challenge.
    pub fn decode(value: &str) -> Option<Self> {
        let mut parts = value.splitn(3, '.');
        let nonce = parts.next()?;
        let issued_at = parts.next()?.parse::<i64>().ok()?;
        let expires_at = parts.next()?.parse::<i64>().ok()?;

        if nonce.is_empty() {
            return None;
        }

        Some(Challenge {
            nonce: nonce.to_string(),
            issued_at: Utc.timestamp_millis_opt(issued_at).single()?,
            expires_at: Utc.timestamp_millis_opt(expires_at).single()?,
        })
    }
}

/// Authentication service
#[derive(Debug, Clone)]
pub struct AuthService {
    domain: String,
    site_uri: String,
    statement: String,
    challenge_ttl: Duration,
    verified_ttl: Duration,
}

impl AuthService {
    /// Create a new AuthService from server configuration.
    ///
    /// `domain` and `site_uri` come from configuration only, never from
    /// request headers, so a client cannot spoof the domain embedded in the
    /// signed payload.
    pub fn new(config: &Config) -> Self {
        Self {
            domain: config.site_domain.clone(),
            site_uri: config.site_url.clone(),
            statement: config.signin_statement.clone(),
            challenge_ttl: Duration::seconds(config.challenge_ttl_seconds),
            verified_ttl: Duration::seconds(config.verified_ttl_seconds),
        }
    }

    /// Canonical site origin this server authenticates for.
    pub fn site_url(&self) -> &str {
        &self.site_uri
    }

    /// TTL of a challenge, in seconds (drives the cookie Max-Age).
    pub fn challenge_ttl_seconds(&self) -> i64 {
        self.challenge_ttl.num_seconds()
    }

    /// TTL of the verified-address marker, in seconds.
    pub fn verified_ttl_seconds(&self) -> i64 {
        self.verified_ttl.num_seconds()
    }

    /// Issue a fresh challenge: 32 random bytes of nonce, valid for the
    /// configured TTL. A previously outstanding challenge for the client is
    /// superseded when the caller overwrites the cookie.
    pub fn issue_challenge(&self) -> Result<Challenge, AuthError> {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AuthError::RngFailure(e.to_string()))?;

        // Truncate to millisecond precision so the value survives the cookie
        // encoding and the message timestamp rendering unchanged
        let now = Utc::now();
        let issued_at = Utc
            .timestamp_millis_opt(now.timestamp_millis())
            .single()
            .unwrap_or(now);

        Ok(Challenge {
            nonce: hex::encode(bytes),
            issued_at,
            expires_at: issued_at + self.challenge_ttl,
        })
    }

    /// Build the sign-in message for a claimed address, issuing a fresh
    /// challenge at the same time. Message preparation and challenge issuance
    /// share one lifecycle: every prepared message gets a new nonce.
    pub fn prepare_message(
        &self,
        address: &str,
        chain_id: i64,
    ) -> Result<(SignInMessage, Challenge), AuthError> {
        if !crypto::is_valid_address(address) {
            return Err(AuthError::InvalidWalletAddress(address.to_string()));
        }
        if chain_id <= 0 {
            return Err(AuthError::InvalidChainId(chain_id));
        }

        let challenge = self.issue_challenge()?;
        let message = SignInMessage {
            domain: self.domain.clone(),
            address: address.to_string(),
            statement: self.statement.clone(),
            uri: self.site_uri.clone(),
            version: "1".to_string(),
            chain_id: chain_id as u64,
            nonce: challenge.nonce.clone(),
            issued_at: challenge.issued_at,
        };

        Ok((message, challenge))
    }

    /// Verify a signed message against the client's stored challenge.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// parse, challenge presence, signature recovery against the claimed
    /// address, domain binding against `request_host`, then nonce equality
    /// and expiry. On success the caller must consume the challenge (clear
    /// the cookie); a failure leaves it untouched so the same challenge can
    /// be retried with a corrected signature until it expires.
    pub fn verify(
        &self,
        message_text: &str,
        signature: &str,
        request_host: &str,
        stored: Option<&Challenge>,
    ) -> Result<String, AuthError> {
        let message: SignInMessage = message_text
            .parse()
            .map_err(|e: super::message::ParseError| AuthError::MalformedMessage(e.to_string()))?;

        let challenge = stored.ok_or(AuthError::MissingChallenge)?;

        let recovered = crypto::recover_address(message_text, signature)?;
        if recovered != message.address.to_lowercase() {
            return Err(AuthError::BadSignature);
        }

        if message.domain != request_host {
            return Err(AuthError::DomainMismatch);
        }

        if message.nonce != challenge.nonce || Utc::now() > challenge.expires_at {
            return Err(AuthError::NonceInvalidOrExpired);
        }

        Ok(recovered)
    }
}
