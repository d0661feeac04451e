//! Dispatch boundary invoked by the scheduler or by inbound events.

use std::sync::Arc;

use serde_json::Value;

use crate::config::{AgentMode, AgentOptions};
use crate::error::{AgentError, Result};
use crate::events::EventEmitter;
use crate::memory::MemoryStore;
use crate::poller::ActivityPoller;
use crate::token::TokenManager;

/// The assembled agent: validated options plus the two components wired
/// to the injected memory store and emitter.
///
/// Each invocation of [`check`](Self::check) or
/// [`receive`](Self::receive) is a complete, isolated cycle; errors are
/// logged here and returned typed, never panicked on, so a scheduler can
/// simply call again next tick.
pub struct StravaAgent {
    options: AgentOptions,
    memory: Arc<dyn MemoryStore>,
    emitter: Arc<dyn EventEmitter>,
    token: Arc<TokenManager>,
    poller: ActivityPoller,
}

impl StravaAgent {
    /// Validate options and wire up both components around one shared
    /// token manager. Fails fast on bad configuration, before any
    /// network call.
    pub fn new(
        options: AgentOptions,
        memory: Arc<dyn MemoryStore>,
        emitter: Arc<dyn EventEmitter>,
    ) -> Result<Self> {
        options.validate()?;
        let token = Arc::new(TokenManager::new(&options, memory.clone()));
        let poller = ActivityPoller::new(&options, memory.clone(), emitter.clone(), token.clone());
        Ok(Self {
            options,
            memory,
            emitter,
            token,
            poller,
        })
    }

    /// Override both provider endpoints, for tests against a mock server.
    pub fn with_base_url(self, base: &str) -> Self {
        let token = Arc::new(
            TokenManager::new(&self.options, self.memory.clone())
                .with_token_url(format!("{base}/api/v3/oauth/token")),
        );
        let poller = ActivityPoller::new(
            &self.options,
            self.memory.clone(),
            self.emitter.clone(),
            token.clone(),
        )
        .with_activities_url(format!("{base}/api/v3/athlete/activities"));
        Self {
            token,
            poller,
            ..self
        }
    }

    /// Scheduler entry point: run one cycle of the configured mode.
    pub async fn check(&self) -> Result<()> {
        self.trigger_action().await
    }

    /// Inbound-event entry point: log each incoming event and run one
    /// cycle per event, sequentially.
    pub async fn receive(&self, incoming: &[Value]) -> Result<()> {
        for event in incoming {
            tracing::debug!(event = %event, "received event");
            self.trigger_action().await?;
        }
        Ok(())
    }

    async fn trigger_action(&self) -> Result<()> {
        let outcome = match self.options.mode {
            AgentMode::TokenRefresh => self.token.refresh().await.map_err(AgentError::from),
            AgentMode::GetActivities => self.poller.poll().await.map_err(AgentError::from),
        };
        if let Err(err) = &outcome {
            if err.is_transient() {
                tracing::warn!(
                    mode = %self.options.mode,
                    error = %err,
                    "agent cycle failed, next scheduled run will retry"
                );
            } else {
                tracing::error!(mode = %self.options.mode, error = %err, "agent cycle failed");
            }
        }
        outcome
    }
}
