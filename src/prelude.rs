//! Convenience re-exports for common use.

pub use crate::agent::StravaAgent;
pub use crate::config::{AgentMode, AgentOptions};
pub use crate::error::{AgentError, Result};
pub use crate::events::{EventEmitter, LogEmitter, VecEmitter};
pub use crate::memory::{FileMemoryStore, InMemoryStore, MemoryStore};
pub use crate::poller::{ActivityPoller, PollError};
pub use crate::token::{TokenError, TokenManager};
