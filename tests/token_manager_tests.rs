//! TokenManager behavior: refresh wire format, expiry threshold, and
//! state handling on malformed responses.

mod support;

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use strava_agent::config::AgentMode;
use strava_agent::memory::{InMemoryStore, MemoryStore, EXPIRES_AT_KEY};
use strava_agent::token::{TokenError, TokenManager};

fn manager(server: &MockServer, memory: Arc<InMemoryStore>) -> TokenManager {
    TokenManager::new(&support::options(AgentMode::TokenRefresh), memory)
        .with_token_url(format!("{}/api/v3/oauth/token", server.uri()))
}

#[tokio::test]
async fn refresh_stores_expires_at_from_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "fresh-access",
            "expires_at": 1_890_000_000,
            "expires_in": 21600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let memory = Arc::new(InMemoryStore::new());
    manager(&server, memory.clone()).refresh().await.unwrap();

    assert_eq!(
        memory.get(EXPIRES_AT_KEY).unwrap(),
        Some(json!(1_890_000_000))
    );
}

#[tokio::test]
async fn refresh_sends_form_encoded_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/oauth/token"))
        .and(body_string_contains("client_id=12345"))
        .and(body_string_contains("client_secret=s3cret"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"expires_at": 1_890_000_000})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let memory = Arc::new(InMemoryStore::new());
    manager(&server, memory).refresh().await.unwrap();
}

#[tokio::test]
async fn refresh_overwrites_expiry_even_on_error_status() {
    // The design parses the body regardless of HTTP status.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/oauth/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"expires_at": 1_900_000_000})),
        )
        .mount(&server)
        .await;

    let memory = Arc::new(InMemoryStore::new());
    memory.set(EXPIRES_AT_KEY, json!(123)).unwrap();
    manager(&server, memory.clone()).refresh().await.unwrap();

    assert_eq!(
        memory.get(EXPIRES_AT_KEY).unwrap(),
        Some(json!(1_900_000_000))
    );
}

#[tokio::test]
async fn refresh_malformed_body_leaves_state_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let memory = Arc::new(InMemoryStore::new());
    memory.set(EXPIRES_AT_KEY, json!(123)).unwrap();
    let err = manager(&server, memory.clone()).refresh().await.unwrap_err();

    assert!(matches!(err, TokenError::MalformedResponse(_)));
    assert_eq!(memory.get(EXPIRES_AT_KEY).unwrap(), Some(json!(123)));
}

#[tokio::test]
async fn refresh_missing_expires_at_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh-access"})),
        )
        .mount(&server)
        .await;

    let memory = Arc::new(InMemoryStore::new());
    let err = manager(&server, memory.clone()).refresh().await.unwrap_err();

    assert!(matches!(err, TokenError::MalformedResponse(_)));
    assert!(memory.get(EXPIRES_AT_KEY).unwrap().is_none());
}

#[tokio::test]
async fn ensure_valid_refreshes_when_no_expiry_stored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"expires_at": 1_890_000_000})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let memory = Arc::new(InMemoryStore::new());
    manager(&server, memory.clone()).ensure_valid().await.unwrap();

    assert_eq!(
        memory.get(EXPIRES_AT_KEY).unwrap(),
        Some(json!(1_890_000_000))
    );
}

#[tokio::test]
async fn ensure_valid_refreshes_one_hour_before_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"expires_at": 1_890_000_000})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let memory = Arc::new(InMemoryStore::new());
    memory
        .set(EXPIRES_AT_KEY, json!(Utc::now().timestamp() + 3600))
        .unwrap();
    manager(&server, memory).ensure_valid().await.unwrap();
}

#[tokio::test]
async fn ensure_valid_skips_refresh_three_hours_before_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"expires_at": 1_890_000_000})),
        )
        .expect(0)
        .mount(&server)
        .await;

    let memory = Arc::new(InMemoryStore::new());
    let stored = Utc::now().timestamp() + 10_800;
    memory.set(EXPIRES_AT_KEY, json!(stored)).unwrap();
    manager(&server, memory.clone()).ensure_valid().await.unwrap();

    // Untouched by the no-op path.
    assert_eq!(memory.get(EXPIRES_AT_KEY).unwrap(), Some(json!(stored)));
}

#[tokio::test]
async fn refresh_surfaces_network_error() {
    let memory = Arc::new(InMemoryStore::new());
    let manager = TokenManager::new(&support::options(AgentMode::TokenRefresh), memory.clone())
        .with_token_url("http://127.0.0.1:1/api/v3/oauth/token");

    let err = manager.refresh().await.unwrap_err();
    assert!(matches!(err, TokenError::Network(_)));
    assert!(memory.get(EXPIRES_AT_KEY).unwrap().is_none());
}
