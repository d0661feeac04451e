//! Error types for the agent.

use thiserror::Error;

use crate::memory::MemoryError;
use crate::poller::PollError;
use crate::token::TokenError;

/// Primary error type for agent operations.
///
/// Component errors ([`TokenError`], [`PollError`]) convert into this at
/// the dispatch boundary; configuration problems are caught before any
/// network call is made.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Token refresh failed: {0}")]
    Token(#[from] TokenError),

    #[error("Activity poll failed: {0}")]
    Poll(#[from] PollError),

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Whether a later scheduled invocation could plausibly succeed
    /// without operator intervention.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Token(err) => matches!(err, TokenError::Network(_)),
            Self::Poll(err) => match err {
                PollError::Network(_) => true,
                PollError::Token(inner) => matches!(inner, TokenError::Network(_)),
                _ => false,
            },
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
