//! Strava integration agent.
//!
//! Polls Strava's athlete activities endpoint, emits one event per newly
//! observed activity, and keeps the OAuth access token fresh by refreshing
//! it when it nears expiry. Host concerns (scheduling, persisted key/value
//! memory, event delivery) are injected through the [`memory::MemoryStore`]
//! and [`events::EventEmitter`] seams, so the same core runs under a cron
//! loop, a test harness, or the bundled CLI.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use strava_agent::agent::StravaAgent;
//! use strava_agent::config::AgentOptions;
//! use strava_agent::events::LogEmitter;
//! use strava_agent::memory::InMemoryStore;
//!
//! # async fn example() -> strava_agent::error::Result<()> {
//! let options = AgentOptions::from_env()?;
//! let agent = StravaAgent::new(
//!     options,
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(LogEmitter),
//! )?;
//! agent.check().await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod events;
mod http;
pub mod memory;
pub mod poller;
pub mod prelude;
pub mod token;

#[cfg(feature = "cli")]
pub mod cli;
