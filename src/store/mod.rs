pub mod history;
pub mod json_store;
pub mod schema;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{AppError, Result};

/// Storage key for the analyzer's report history.
pub const HISTORY_KEY: &str = "analysis_history";
/// Storage key for the prosody quiz aggregate.
pub const STATS_KEY: &str = "arudi_assessment_stats";

/// Durable string blobs addressed by key.
///
/// Stores are read once at startup by their owners; after that the in-memory
/// copy is authoritative and the backing store only receives writes.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, String>,
    writes: usize,
    fail_writes: bool,
}

/// In-memory store. Clones share the same contents, so a test can keep a
/// handle while the owner under test holds another.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.lock().entries.insert(key.to_string(), value.to_string());
        store
    }

    /// Make every subsequent write fail as if the quota were exhausted.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        // A poisoned lock only means another test thread panicked mid-write;
        // the map itself is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(AppError::Storage(format!("quota exceeded writing {key}")));
        }
        inner.entries.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_contents() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.write(HISTORY_KEY, "[]").unwrap();
        assert_eq!(handle.get(HISTORY_KEY).as_deref(), Some("[]"));
        assert_eq!(handle.write_count(), 1);
    }

    #[test]
    fn failing_writes_keep_previous_value() {
        let store = MemoryStore::with_entry(STATS_KEY, "{}");
        store.set_fail_writes(true);
        assert!(matches!(
            store.write(STATS_KEY, "{\"x\":1}"),
            Err(AppError::Storage(_))
        ));
        assert_eq!(store.get(STATS_KEY).as_deref(), Some("{}"));
        assert_eq!(store.write_count(), 0);
    }
}
