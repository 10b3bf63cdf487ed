//! Identity provider client
//!
//! Redirect-based OAuth contract with the hosted identity provider: build the
//! login redirect, then exchange the callback code for a session. The
//! provider itself is an external collaborator; wallet login does not pass
//! through here.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

/// Identity provider errors
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Identity provider request failed: {0}")]
    Transport(String),

    #[error("Identity provider rejected the exchange with status {0}")]
    Rejected(u16),

    #[error("Callback URL carries no authorization code")]
    MissingCode,

    #[error("Identity provider returned malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        IdentityError::Transport(err.to_string())
    }
}

/// Session issued by the identity provider after a successful code exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Client for the hosted identity provider
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    provider_url: String,
    client_id: String,
}

impl IdentityClient {
    pub fn new(config: &Config) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            provider_url: config.identity_provider_url.trim_end_matches('/').to_string(),
            client_id: config.identity_client_id.clone(),
        })
    }

    /// Build the provider URL the browser is redirected to for login.
    pub fn login_redirect_url(&self, return_url: &str) -> String {
        format!(
            "{}/authorize?client_id={}&response_type=code&redirect_uri={}",
            self.provider_url,
            urlencode(&self.client_id),
            urlencode(return_url)
        )
    }

    /// Exchange the authorization code carried by a callback URL for a
    /// provider session.
    pub async fn exchange_code_for_session(
        &self,
        callback_url: &str,
    ) -> Result<ProviderSession, IdentityError> {
        let code = query_param(callback_url, "code").ok_or(IdentityError::MissingCode)?;

        let response = self
            .http
            .post(format!("{}/token", self.provider_url))
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("code", code.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Rejected(status.as_u16()));
        }

        response
            .json::<ProviderSession>()
            .await
            .map_err(|e| IdentityError::MalformedPayload(e.to_string()))
    }
}

/// Extract a query parameter from a URL without a full URL parser.
fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Minimal percent-encoding for query string values.
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_url() {
        let client = IdentityClient::new(&Config::for_tests()).unwrap();
        let url = client.login_redirect_url("https://lacra.example/profile");

        assert!(url.starts_with("https://id.lacra.example/authorize?"));
        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Flacra.example%2Fprofile"));
    }

    #[test]
    fn test_query_param() {
        assert_eq!(
            query_param("https://x/cb?code=abc123&state=s", "code").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            query_param("https://x/cb?state=s&code=abc123", "code").as_deref(),
            Some("abc123")
        );
        assert_eq!(query_param("https://x/cb?code=abc#frag", "code").as_deref(), Some("abc"));
        assert_eq!(query_param("https://x/cb?state=s", "code"), None);
        assert_eq!(query_param("https://x/cb", "code"), None);
        assert_eq!(query_param("https://x/cb?code=", "code"), None);
    }

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("abc-123_~.ok"), "abc-123_~.ok");
        assert_eq!(urlencode("a b/c"), "a%20b%2Fc");
    }
}
