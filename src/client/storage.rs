use std::collections::HashMap;
use std::fmt;
use std::sync::{ Arc, Mutex, MutexGuard };

/// Storage key holding the raw upstream credential.
pub const CREDENTIAL_KEY: &str = "pplx_key";

/// Session-scoped key-value storage. Entries live as long as the session
/// that owns the store and are never written to disk.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-process store. Clones share the same entries, so a client can be
/// re-mounted over the store of a previous one.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}

// Values are credentials; only keys are shown.
impl fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries();
        f.debug_set().entries(entries.keys()).finish()
    }
}
