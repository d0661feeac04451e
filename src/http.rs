//! Shared HTTP client for both provider endpoints.

use std::sync::OnceLock;
use std::time::Duration;

/// Transport timeout for every provider call; the core has no retry
/// logic, so a stalled connection must fail before the next tick.
const TIMEOUT_SECS: u64 = 30;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub(crate) fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client")
    })
}
