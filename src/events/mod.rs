//! Event emission seam between the poller and the host.

use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Emit failed: {0}")]
    Delivery(String),
}

/// One call per newly observed activity; the host assigns event identity
/// and timestamps.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, payload: &Value) -> Result<(), EmitError>;
}

/// Emitter that writes each payload through `tracing` (CLI default).
#[derive(Debug, Default)]
pub struct LogEmitter;

impl EventEmitter for LogEmitter {
    fn emit(&self, payload: &Value) -> Result<(), EmitError> {
        tracing::info!(event = %payload, "new activity event");
        Ok(())
    }
}

/// Emitter that collects payloads in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct VecEmitter {
    events: Mutex<Vec<Value>>,
}

impl VecEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in emission order.
    pub fn emitted(&self) -> Vec<Value> {
        self.events.lock().expect("emitter lock poisoned").clone()
    }
}

impl EventEmitter for VecEmitter {
    fn emit(&self, payload: &Value) -> Result<(), EmitError> {
        self.events
            .lock()
            .expect("emitter lock poisoned")
            .push(payload.clone());
        Ok(())
    }
}
