//! OAuth token lifecycle: expiry tracking and refresh.

use std::sync::Arc;

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::AgentOptions;
use crate::memory::{MemoryError, MemoryStore, EXPIRES_AT_KEY};

const DEFAULT_TOKEN_URL: &str = "https://www.strava.com/api/v3/oauth/token";

/// Refresh whenever less than this many hours remain on the access token.
/// Policy constant, deliberately not configurable.
const REFRESH_THRESHOLD_HOURS: f64 = 2.0;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Malformed token response: {0}")]
    MalformedResponse(String),
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),
}

impl From<reqwest::Error> for TokenError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

/// Owns the persisted `expires_at` state and decides when a refresh is due.
///
/// The refresh response's `access_token` is intentionally ignored: the
/// bearer token stays whatever the configuration supplied. Only the expiry
/// window is tracked here.
pub struct TokenManager {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    memory: Arc<dyn MemoryStore>,
    debug: bool,
}

impl TokenManager {
    pub fn new(options: &AgentOptions, memory: Arc<dyn MemoryStore>) -> Self {
        Self {
            client: crate::http::shared_client().clone(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: options.client_id.clone(),
            client_secret: options.client_secret.clone(),
            refresh_token: options.refresh_token.clone(),
            memory,
            debug: options.debug,
        }
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Refresh the token unless the stored expiry is comfortably far out.
    ///
    /// Absent or unreadable expiry state means refresh; otherwise refresh
    /// only when fewer than two hours remain.
    pub async fn ensure_valid(&self) -> Result<(), TokenError> {
        let stored = self
            .memory
            .get(EXPIRES_AT_KEY)?
            .and_then(|value| value.as_i64());
        match stored {
            None => self.refresh().await,
            Some(expires_at) => {
                let hours_remaining = (expires_at - Utc::now().timestamp()) as f64 / 3600.0;
                if hours_remaining < REFRESH_THRESHOLD_HOURS {
                    tracing::info!(hours_remaining, "access token near expiry, refreshing");
                    self.refresh().await
                } else {
                    tracing::info!("refresh not needed");
                    Ok(())
                }
            }
        }
    }

    /// Exchange the refresh token for a new expiry window.
    ///
    /// The response body is parsed regardless of HTTP status; only a body
    /// that fails to parse (or lacks an integer `expires_at`) leaves the
    /// stored state untouched.
    pub async fn refresh(&self) -> Result<(), TokenError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", self.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        self.log_response(status, &body);

        let payload: Value = serde_json::from_str(&body)
            .map_err(|err| TokenError::MalformedResponse(err.to_string()))?;
        let expires_at = payload
            .get("expires_at")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                TokenError::MalformedResponse("expires_at missing or not an integer".to_string())
            })?;

        self.memory.set(EXPIRES_AT_KEY, json!(expires_at))?;
        tracing::debug!(expires_at, "stored new token expiry");
        Ok(())
    }

    fn log_response(&self, status: StatusCode, body: &str) {
        tracing::info!(status = %status, "token endpoint request status");
        if self.debug {
            tracing::info!(%body, "token endpoint response body");
        }
    }
}
