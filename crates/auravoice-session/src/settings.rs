//! Key-value settings boundary
//!
//! Application settings live outside this subsystem; all it needs is a
//! string-keyed boolean store for the continuous-listening preference. The
//! hosting application supplies the real store; tests use the in-memory one.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Key for the persisted continuous-listening preference.
pub const CONTINUOUS_LISTENING_KEY: &str = "voice.continuous_listening";

/// Persisted boolean settings, get/set by string key.
pub trait SettingsStore: Send + Sync {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn set_bool(&self, key: &str, value: bool);
}

/// In-memory settings store.
#[derive(Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, bool>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_continuous_listening(enabled: bool) -> Self {
        let store = Self::new();
        store.set_bool(CONTINUOUS_LISTENING_KEY, enabled);
        store
    }
}

impl SettingsStore for MemorySettings {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.read().get(key).copied()
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.values.write().insert(key.to_string(), value);
    }
}
