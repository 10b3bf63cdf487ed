//! Hosted data store client
//!
//! Thin client for the platform's hosted relational-database-as-a-service
//! (PostgREST-style API). The store itself is an external collaborator; this
//! module only provides the `select`/`insert`/`update` seam the rest of the
//! server talks through. Row-level access control is enforced by the store,
//! keyed on the caller's identity.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

/// Data store error
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Transport(String),

    #[error("Store rejected request with status {0}")]
    Rejected(u16),

    #[error("Store returned malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Store client misconfigured: {0}")]
    Misconfigured(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

/// Client handle for the hosted data store.
///
/// Constructed once at process start from validated configuration and passed
/// by reference through `AppState`; there is no lazily-initialized global.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl StoreClient {
    /// Create a store client from configuration.
    ///
    /// Fails if the configured endpoint or key is unusable; a missing store
    /// is a boot-time error, never a silent null handle.
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        if config.store_url.is_empty() || config.store_api_key.is_empty() {
            return Err(StoreError::Misconfigured(
                "STORE_URL and STORE_API_KEY must be set".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.store_api_key))
            .map_err(|e| StoreError::Misconfigured(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.store_api_key)
                .map_err(|e| StoreError::Misconfigured(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.store_url.trim_end_matches('/').to_string(),
        })
    }

    /// Select rows from a table. Filters are column/value pairs combined
    /// with equality.
    pub async fn select(
        &self,
        table: &str,
        filter: &[(&str, &str)],
    ) -> Result<Vec<Value>, StoreError> {
        let response = self
            .http
            .get(self.table_url(table))
            .query(&eq_filters(filter))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Rejected(status.as_u16()));
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))
    }

    /// Insert a record into a table, returning the stored representation.
    pub async fn insert(&self, table: &str, record: &Value) -> Result<Value, StoreError> {
        let response = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Rejected(status.as_u16()));
        }

        // The store answers inserts with a one-element array
        let mut rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedPayload(e.to_string()))?;
        rows.pop()
            .ok_or_else(|| StoreError::MalformedPayload("empty insert response".to_string()))
    }

    /// Apply a patch to all rows matching the filter.
    pub async fn update(
        &self,
        table: &str,
        filter: &[(&str, &str)],
        patch: &Value,
    ) -> Result<(), StoreError> {
        let response = self
            .http
            .patch(self.table_url(table))
            .query(&eq_filters(filter))
            .json(patch)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Rejected(status.as_u16()));
        }

        Ok(())
    }

    /// Check store reachability (for health checks).
    pub async fn health(&self) -> Result<(), StoreError> {
        let response = self.http.get(format!("{}/", self.base_url)).send().await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(StoreError::Rejected(status.as_u16()));
        }

        Ok(())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

fn eq_filters(filter: &[(&str, &str)]) -> Vec<(String, String)> {
    filter
        .iter()
        .map(|(column, value)| (column.to_string(), format!("eq.{}", value)))
        .collect()
}
