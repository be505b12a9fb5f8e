//! Persisted session configuration
//!
//! Two scalar values survive process restarts: the host's compensation delay
//! and whether the transport should prefer a TURN relay. They live as plain
//! key/value entries in a small JSON file.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Values persisted across process restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    /// Extra delay (ms) applied only to the host's own execution of
    /// scheduled commands. May be negative.
    #[serde(default)]
    pub host_delay_ms: i64,
    /// Whether the peer transport should route through a TURN relay.
    #[serde(default)]
    pub use_turn_relay: bool,
}

impl Default for StoredConfig {
    fn default() -> Self {
        Self {
            host_delay_ms: 0,
            use_turn_relay: false,
        }
    }
}

/// Storage backend for [`StoredConfig`].
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> StoredConfig;
    fn store(&self, config: &StoredConfig);
}

/// JSON-file backed config store.
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> StoredConfig {
        match fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("malformed config at {}: {}", self.path.display(), e);
                StoredConfig::default()
            }),
            Err(_) => StoredConfig::default(),
        }
    }

    fn store(&self, config: &StoredConfig) {
        let contents = match serde_json::to_string_pretty(config) {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to serialize config: {}", e);
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(e) = fs::write(&self.path, contents) {
            warn!("failed to write config to {}: {}", self.path.display(), e);
        }
    }
}

/// In-memory config store for embedders that manage persistence themselves.
#[derive(Default)]
pub struct MemoryConfigStore {
    config: parking_lot::Mutex<StoredConfig>,
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> StoredConfig {
        self.config.lock().clone()
    }

    fn store(&self, config: &StoredConfig) {
        *self.config.lock() = config.clone();
    }
}
