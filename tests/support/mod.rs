//! Shared fixtures for integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};

use strava_agent::config::{AgentMode, AgentOptions};

pub fn options(mode: AgentMode) -> AgentOptions {
    AgentOptions {
        mode,
        client_id: "12345".to_string(),
        client_secret: "s3cret".to_string(),
        refresh_token: "refresh-token".to_string(),
        bearer_token: "bearer-token".to_string(),
        debug: false,
        expected_receive_period_in_days: 2,
    }
}

/// Minimal activity record in the provider's shape.
pub fn activity(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "type": "Walk",
        "sport_type": "Walk",
        "name": name,
        "distance": 5091.0,
        "moving_time": 2454,
        "start_date": "2023-11-11T13:45:53Z",
        "location_city": null,
        "map": {"id": format!("a{id}"), "resource_state": 2}
    })
}

/// An `expires_at` comfortably past the refresh threshold.
pub fn far_future_expiry() -> i64 {
    chrono::Utc::now().timestamp() + 10 * 3600
}
