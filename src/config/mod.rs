//! Configuration management for the LAcra auth server
//!
//! This module handles loading and validating configuration from environment
//! variables, with support for different environments (development, staging,
//! production).

use std::env;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),

    #[error("COOKIE_SECRET must be at least {0} bytes")]
    WeakCookieSecret(usize),
}

/// Minimum length of the cookie signing secret, in bytes.
const MIN_COOKIE_SECRET_BYTES: usize = 32;

/// Application environment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Get the environment name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Current environment
    pub environment: Environment,

    /// Server port
    pub port: u16,

    /// Canonical site origin, embedded as the sign-in message `uri`
    pub site_url: String,

    /// Externally visible hostname, embedded as the sign-in message `domain`.
    /// Always taken from configuration, never from request headers.
    pub site_domain: String,

    /// Human-readable statement shown to the wallet owner before signing
    pub signin_statement: String,

    /// Secret for signing challenge and verified-address cookies
    pub cookie_secret: String,

    /// Challenge TTL in seconds (default: 600 = 10 minutes)
    pub challenge_ttl_seconds: i64,

    /// Verified-address marker TTL in seconds (default: 86400 = 24 hours)
    pub verified_ttl_seconds: i64,

    /// Hosted data store REST endpoint
    pub store_url: String,

    /// API key for the hosted data store
    pub store_api_key: String,

    /// OAuth identity provider base URL
    pub identity_provider_url: String,

    /// OAuth client id registered with the identity provider
    pub identity_client_id: String,

    /// Rate limit: requests per second per IP
    pub rate_limit_rps: u32,

    /// CORS allowed origins
    pub cors_allowed_origins: Option<String>,

    /// Log level (RUST_LOG)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .map(|s| Environment::from_str(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let site_url = env::var("SITE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("SITE_URL".to_string()))?;

        let site_domain = match env::var("SITE_DOMAIN") {
            Ok(domain) => domain,
            Err(_) => host_of(&site_url).ok_or_else(|| {
                ConfigError::InvalidValue(format!("Cannot derive host from SITE_URL: {}", site_url))
            })?,
        };

        let signin_statement =
            env::var("SIGNIN_STATEMENT").unwrap_or_else(|_| "Sign in to LAcra".to_string());

        let cookie_secret = env::var("COOKIE_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("COOKIE_SECRET".to_string()))?;
        if cookie_secret.len() < MIN_COOKIE_SECRET_BYTES {
            return Err(ConfigError::WeakCookieSecret(MIN_COOKIE_SECRET_BYTES));
        }

        let challenge_ttl_seconds = env::var("CHALLENGE_TTL_SECONDS")
            .unwrap_or_else(|_| "600".to_string())
            .parse::<i64>()
            .unwrap_or(600);

        let verified_ttl_seconds = env::var("VERIFIED_TTL_SECONDS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse::<i64>()
            .unwrap_or(86400);

        // An absent store handle must fail loudly at boot, never produce a
        // silently null client
        let store_url = env::var("STORE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("STORE_URL".to_string()))?;
        let store_api_key = env::var("STORE_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("STORE_API_KEY".to_string()))?;

        let identity_provider_url = env::var("IDENTITY_PROVIDER_URL")
            .map_err(|_| ConfigError::MissingEnvVar("IDENTITY_PROVIDER_URL".to_string()))?;
        let identity_client_id = env::var("IDENTITY_CLIENT_ID")
            .map_err(|_| ConfigError::MissingEnvVar("IDENTITY_CLIENT_ID".to_string()))?;

        let rate_limit_rps = env::var("RATE_LIMIT_RPS")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<u32>()
            .unwrap_or(20);

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok();

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            environment,
            port,
            site_url,
            site_domain,
            signin_statement,
            cookie_secret,
            challenge_ttl_seconds,
            verified_ttl_seconds,
            store_url,
            store_api_key,
            identity_provider_url,
            identity_client_id,
            rate_limit_rps,
            cors_allowed_origins,
            log_level,
        })
    }

    /// Fixed configuration for tests; never reads the process environment.
    pub fn for_tests() -> Self {
        Config {
            environment: Environment::Development,
            port: 3001,
            site_url: "https://lacra.example".to_string(),
            site_domain: "lacra.example".to_string(),
            signin_statement: "Sign in to LAcra".to_string(),
            cookie_secret: "0123456789abcdef0123456789abcdef".to_string(),
            challenge_ttl_seconds: 600,
            verified_ttl_seconds: 86400,
            store_url: "https://store.lacra.example".to_string(),
            store_api_key: "test-store-key".to_string(),
            identity_provider_url: "https://id.lacra.example".to_string(),
            identity_client_id: "test-client".to_string(),
            rate_limit_rps: 20,
            cors_allowed_origins: None,
            log_level: "info".to_string(),
        }
    }

    /// Store API key masked for logging
    pub fn store_api_key_masked(&self) -> String {
        // Take whole characters, not bytes, so a multibyte key cannot panic
        let visible: String = self.store_api_key.chars().take(4).collect();
        format!("{}****", visible)
    }
}

/// Extract the host (authority) component of an origin URL.
fn host_of(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let host = rest.split('/').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
