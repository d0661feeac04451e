//! Persisted key/value memory shared by the agent's components.
//!
//! The host owns durability; the core only sees this narrow get/set
//! contract. Two keys are used: [`EXPIRES_AT_KEY`] and [`LAST_STATUS_KEY`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::Value;
use thiserror::Error;

/// Memory key holding the access token expiry (JSON integer, unix seconds).
pub const EXPIRES_AT_KEY: &str = "expires_at";
/// Memory key holding the last fetched activity list (JSON array).
pub const LAST_STATUS_KEY: &str = "last_status";

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for MemoryError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for MemoryError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Storage abstraction over the host's persisted key/value memory.
pub trait MemoryStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, MemoryError>;
    fn set(&self, key: &str, value: Value) -> Result<(), MemoryError>;
}

/// File-backed memory store: one JSON file per key under a base directory.
#[derive(Debug)]
pub struct FileMemoryStore {
    base_dir: PathBuf,
}

impl FileMemoryStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Store rooted at `~/.strava-agent` (falls back to a relative dir
    /// when no home directory is available).
    pub fn new_default() -> Self {
        Self {
            base_dir: default_memory_dir(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", normalize_key(key)))
    }

    fn ensure_parent(path: &Path) -> Result<(), MemoryError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl MemoryStore for FileMemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, MemoryError> {
        let path = self.key_path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(MemoryError::Io(err.to_string())),
        };
        let value: Value = serde_json::from_str(&raw)?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), MemoryError> {
        let path = self.key_path(key);
        Self::ensure_parent(&path)?;
        let serialized = serde_json::to_string_pretty(&value)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

/// Volatile memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, MemoryError> {
        let values = self.values.read().expect("memory lock poisoned");
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), MemoryError> {
        let mut values = self.values.write().expect("memory lock poisoned");
        values.insert(key.to_string(), value);
        Ok(())
    }
}

fn default_memory_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".strava-agent"))
        .unwrap_or_else(|| PathBuf::from(".strava-agent"))
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .map(|ch| {
            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii_alphanumeric() || lower == '-' || lower == '_' {
                lower
            } else {
                '-'
            }
        })
        .collect()
}
