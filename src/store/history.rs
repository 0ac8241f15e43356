use tracing::{debug, warn};

use crate::store::schema::HistoryRecord;
use crate::store::{HISTORY_KEY, KeyValueStore};

pub const MAX_HISTORY: usize = 50;

/// Past analyses, most recent first, mirrored to a [`KeyValueStore`].
///
/// Storage is read once in [`HistoryStore::load`]. Write failures are logged
/// and swallowed: the in-memory list keeps working for the current session.
pub struct HistoryStore {
    storage: Box<dyn KeyValueStore>,
    records: Vec<HistoryRecord>,
}

impl HistoryStore {
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let records = match storage.read(HISTORY_KEY) {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<HistoryRecord>>(&blob) {
                Ok(mut records) => {
                    records.truncate(MAX_HISTORY);
                    records
                }
                Err(e) => {
                    // Leave the blob alone; the next append replaces it.
                    warn!(error = %e, key = HISTORY_KEY, "history blob unreadable, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, key = HISTORY_KEY, "history storage unavailable");
                Vec::new()
            }
        };
        debug!(count = records.len(), "history loaded");
        Self { storage, records }
    }

    pub fn append(&mut self, record: HistoryRecord) {
        self.records.insert(0, record);
        self.records.truncate(MAX_HISTORY);
        self.persist();
    }

    /// Remove by id. Returns whether anything was removed; an unknown id is
    /// a no-op and does not touch storage.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn list(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn persist(&self) {
        let json = match serde_json::to_string_pretty(&self.records) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "history serialization failed");
                return;
            }
        };
        if let Err(e) = self.storage.write(HISTORY_KEY, &json) {
            warn!(error = %e, count = self.records.len(), "history not persisted");
        }
    }
}
