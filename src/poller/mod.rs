//! Activity polling: fetch, diff against the stored snapshot, emit.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::config::AgentOptions;
use crate::events::{EmitError, EventEmitter};
use crate::memory::{MemoryError, MemoryStore, LAST_STATUS_KEY};
use crate::token::{TokenError, TokenManager};

const DEFAULT_ACTIVITIES_URL: &str = "https://www.strava.com/api/v3/athlete/activities";

#[derive(Debug, Error)]
pub enum PollError {
    #[error("Token refresh failed: {0}")]
    Token(#[from] TokenError),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Malformed activities response: {0}")]
    MalformedResponse(String),
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),
    #[error("Emit error: {0}")]
    Emit(#[from] EmitError),
}

impl From<reqwest::Error> for PollError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

/// Fetches the athlete's activity list and emits one event per activity
/// not present in the previous snapshot.
///
/// Activities are opaque JSON objects; "already seen" means a deep-equal
/// match against any entry of the stored snapshot, not an id comparison.
/// The linear scan is O(new x old), which is fine at the tens-of-items
/// page sizes the API returns.
pub struct ActivityPoller {
    client: reqwest::Client,
    activities_url: String,
    bearer_token: String,
    memory: Arc<dyn MemoryStore>,
    emitter: Arc<dyn EventEmitter>,
    token: Arc<TokenManager>,
    debug: bool,
}

impl ActivityPoller {
    pub fn new(
        options: &AgentOptions,
        memory: Arc<dyn MemoryStore>,
        emitter: Arc<dyn EventEmitter>,
        token: Arc<TokenManager>,
    ) -> Self {
        Self {
            client: crate::http::shared_client().clone(),
            activities_url: DEFAULT_ACTIVITIES_URL.to_string(),
            bearer_token: options.bearer_token.clone(),
            memory,
            emitter,
            token,
            debug: options.debug,
        }
    }

    pub fn with_activities_url(mut self, url: impl Into<String>) -> Self {
        self.activities_url = url.into();
        self
    }

    /// One polling cycle: ensure the token is valid, fetch, diff, emit,
    /// persist the new snapshot.
    pub async fn poll(&self) -> Result<(), PollError> {
        self.token.ensure_valid().await?;

        let response = self
            .client
            .get(&self.activities_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.bearer_token))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        self.log_response(status, &body);

        let payload: Value = serde_json::from_str(&body)
            .map_err(|err| PollError::MalformedResponse(err.to_string()))?;
        let fresh = payload
            .as_array()
            .ok_or_else(|| {
                PollError::MalformedResponse("expected a JSON array of activities".to_string())
            })?
            .clone();

        let stored = self
            .memory
            .get(LAST_STATUS_KEY)?
            .and_then(|value| value.as_array().cloned());

        if stored.as_deref() == Some(fresh.as_slice()) {
            tracing::debug!("no diff");
            return Ok(());
        }

        let stored = stored.unwrap_or_default();
        if self.debug && !stored.is_empty() {
            // Bound first: a path inside the macro would resolve to the
            // `tracing::Value` trait instead of serde_json's enum.
            let snapshot = Value::Array(stored.clone());
            tracing::info!(last_status = %snapshot, "previous snapshot");
        }

        for activity in &fresh {
            if is_seen(activity, &stored) {
                if self.debug {
                    tracing::info!(activity = %describe(activity), "already seen, skipping");
                }
            } else {
                tracing::info!(activity = %describe(activity), "emitting new activity");
                self.emitter.emit(activity)?;
            }
        }

        // Total replacement: removed or reordered entries leave no trace.
        self.memory.set(LAST_STATUS_KEY, Value::Array(fresh))?;
        Ok(())
    }

    fn log_response(&self, status: StatusCode, body: &str) {
        tracing::info!(status = %status, "activities endpoint request status");
        if self.debug {
            tracing::info!(%body, "activities endpoint response body");
        }
    }
}

/// True when a deep-equal match for `activity` exists anywhere in the
/// stored snapshot. An absent or empty snapshot matches nothing, so on
/// first run every fetched activity counts as new.
fn is_seen(activity: &Value, stored: &[Value]) -> bool {
    stored.iter().any(|previous| previous == activity)
}

/// Short human-readable tag for log lines: the activity's `type` and `id`
/// when present, the whole record otherwise.
fn describe(activity: &Value) -> String {
    match (activity.get("type"), activity.get("id")) {
        (Some(kind), Some(id)) => format!("{kind} {id}"),
        _ => activity.to_string(),
    }
}
