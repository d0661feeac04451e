//! Agent configuration (TOML file, environment variables, or code).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::AgentError;

/// What a scheduled invocation should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentMode {
    /// Only refresh the OAuth access token.
    TokenRefresh,
    /// Poll the activities endpoint (refreshing the token first if needed).
    GetActivities,
}

/// Validated agent options.
///
/// `debug` gates verbose logging of response bodies and dedup decisions,
/// independent of the tracing subscriber's level.
/// `expected_receive_period_in_days` is carried for the host's liveness
/// probe; the core itself never reads it after validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOptions {
    #[serde(rename = "type")]
    pub mode: AgentMode,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub bearer_token: String,
    #[serde(default)]
    pub debug: bool,
    pub expected_receive_period_in_days: u32,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            mode: AgentMode::GetActivities,
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            bearer_token: String::new(),
            debug: false,
            expected_receive_period_in_days: 2,
        }
    }
}

impl AgentOptions {
    /// Load options from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let options: Self = toml::from_str(&raw)
            .map_err(|err| AgentError::Configuration(err.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from `STRAVA_*` environment variables.
    ///
    /// Reads `STRAVA_TYPE` (default `get_activities`), `STRAVA_CLIENT_ID`,
    /// `STRAVA_CLIENT_SECRET`, `STRAVA_REFRESH_TOKEN`, `STRAVA_BEARER_TOKEN`,
    /// `STRAVA_DEBUG`, and `STRAVA_EXPECTED_RECEIVE_PERIOD_IN_DAYS`.
    pub fn from_env() -> Result<Self, AgentError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    fn from_vars(vars: &HashMap<String, String>) -> Result<Self, AgentError> {
        let get = |key: &str| vars.get(key).cloned().unwrap_or_default();

        let mode = match vars.get("STRAVA_TYPE") {
            None => AgentMode::GetActivities,
            Some(raw) => raw.parse().map_err(|_| {
                AgentError::Configuration(format!(
                    "type has invalid value: {raw} (should be 'token_refresh' or 'get_activities')"
                ))
            })?,
        };
        let debug = match vars.get("STRAVA_DEBUG") {
            None => false,
            Some(raw) => parse_bool(raw).ok_or_else(|| {
                AgentError::Configuration("if provided, debug must be true or false".to_string())
            })?,
        };
        let period = match vars.get("STRAVA_EXPECTED_RECEIVE_PERIOD_IN_DAYS") {
            None => 2,
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                AgentError::Configuration(
                    "expected_receive_period_in_days must be a positive integer".to_string(),
                )
            })?,
        };

        let options = Self {
            mode,
            client_id: get("STRAVA_CLIENT_ID"),
            client_secret: get("STRAVA_CLIENT_SECRET"),
            refresh_token: get("STRAVA_REFRESH_TOKEN"),
            bearer_token: get("STRAVA_BEARER_TOKEN"),
            debug,
            expected_receive_period_in_days: period,
        };
        options.validate()?;
        Ok(options)
    }

    /// Check every required field before any network call is attempted.
    pub fn validate(&self) -> Result<(), AgentError> {
        let required = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("refresh_token", &self.refresh_token),
            ("bearer_token", &self.bearer_token),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AgentError::Configuration(format!(
                    "{name} is a required field"
                )));
            }
        }
        if self.expected_receive_period_in_days == 0 {
            return Err(AgentError::Configuration(
                "expected_receive_period_in_days must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
