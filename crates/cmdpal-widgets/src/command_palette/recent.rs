#![forbid(unsafe_code)]

//! Most-recently-used commands, persisted through a [`StorageBackend`].
//!
//! The list is read once when the tracker is created and written back after
//! every [`RecencyTracker::add`]. The payload is the JSON array of commands,
//! most recent first, stored under one key.
//!
//! Storage faults never escape: a failed or garbled read starts from an
//! empty list and a failed write is logged and dropped.

use std::fmt;
use std::sync::Arc;

use cmdpal_runtime::{StorageBackend, StoredEntry};

use super::command::Command;

/// Default cap on remembered commands.
pub const DEFAULT_RECENT_MAX: usize = 5;
/// Default storage key.
pub const DEFAULT_RECENT_KEY: &str = "cmdpal-recent";

const RECENT_FORMAT_VERSION: u32 = 1;

/// Bounded MRU list of selected commands, deduplicated by `id`.
pub struct RecencyTracker {
    storage: Option<Arc<dyn StorageBackend>>,
    key: String,
    max: usize,
    items: Vec<Command>,
}

impl RecencyTracker {
    /// A tracker that remembers nothing.
    pub fn disabled() -> Self {
        Self {
            storage: None,
            key: DEFAULT_RECENT_KEY.to_string(),
            max: DEFAULT_RECENT_MAX,
            items: Vec::new(),
        }
    }

    /// Create a tracker and load the stored list under `key`.
    pub fn new(storage: Arc<dyn StorageBackend>, key: impl Into<String>, max: usize) -> Self {
        let key = key.into();
        let mut items = read_list(storage.as_ref(), &key);
        items.truncate(max);
        tracing::debug!(
            backend = storage.name(),
            key = %key,
            loaded = items.len(),
            "recent commands loaded"
        );
        Self {
            storage: Some(storage),
            key,
            max,
            items,
        }
    }

    /// Whether selections are recorded.
    pub fn is_enabled(&self) -> bool {
        self.storage.is_some()
    }

    /// The backing store, when enabled.
    pub fn storage(&self) -> Option<&Arc<dyn StorageBackend>> {
        self.storage.as_ref()
    }

    /// Remembered commands, most recent first.
    pub fn items(&self) -> &[Command] {
        &self.items
    }

    /// Configured cap.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Move `command` to the front, evicting past the cap, and persist.
    ///
    /// No-op when disabled.
    pub fn add(&mut self, command: &Command) {
        let Some(storage) = &self.storage else {
            return;
        };
        self.items.retain(|c| c.id != command.id);
        self.items.insert(0, command.clone());
        self.items.truncate(self.max);
        write_list(storage.as_ref(), &self.key, &self.items);
    }
}

fn read_list(storage: &dyn StorageBackend, key: &str) -> Vec<Command> {
    let entry = match storage.load(key) {
        Ok(Some(entry)) => entry,
        Ok(None) => return Vec::new(),
        Err(error) => {
            tracing::warn!(backend = storage.name(), key, %error, "failed to read recent commands");
            return Vec::new();
        }
    };
    if entry.version != RECENT_FORMAT_VERSION {
        tracing::warn!(
            key,
            stored = entry.version,
            expected = RECENT_FORMAT_VERSION,
            "recent commands version mismatch, starting empty"
        );
        return Vec::new();
    }
    serde_json::from_slice(&entry.data).unwrap_or_else(|error| {
        tracing::warn!(key, %error, "recent commands are not valid JSON, starting empty");
        Vec::new()
    })
}

fn write_list(storage: &dyn StorageBackend, key: &str, items: &[Command]) {
    let data = match serde_json::to_vec(items) {
        Ok(data) => data,
        Err(error) => {
            tracing::warn!(key, %error, "failed to encode recent commands");
            return;
        }
    };
    if let Err(error) = storage.store(StoredEntry::new(key, RECENT_FORMAT_VERSION, data)) {
        tracing::warn!(backend = storage.name(), key, %error, "failed to write recent commands");
    }
}

impl fmt::Debug for RecencyTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecencyTracker")
            .field("enabled", &self.is_enabled())
            .field("key", &self.key)
            .field("max", &self.max)
            .field("items", &self.items.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdpal_runtime::{MemoryStorage, StorageError, StorageResult};

    struct Broken;

    impl StorageBackend for Broken {
        fn name(&self) -> &str {
            "Broken"
        }
        fn load(&self, _key: &str) -> StorageResult<Option<StoredEntry>> {
            Err(StorageError::Unavailable("offline".into()))
        }
        fn store(&self, _entry: StoredEntry) -> StorageResult<()> {
            Err(StorageError::Unavailable("offline".into()))
        }
        fn remove(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    fn cmd(id: &str) -> Command {
        Command::new(id, id.to_uppercase())
    }

    fn ids(tracker: &RecencyTracker) -> Vec<&str> {
        tracker.items().iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn disabled_records_nothing() {
        let mut tracker = RecencyTracker::disabled();
        tracker.add(&cmd("a"));
        assert!(!tracker.is_enabled());
        assert!(tracker.items().is_empty());
    }

    #[test]
    fn most_recent_first_and_dedup() {
        let mut tracker = RecencyTracker::new(Arc::new(MemoryStorage::new()), "k", 5);
        tracker.add(&cmd("a"));
        tracker.add(&cmd("b"));
        tracker.add(&cmd("a"));
        assert_eq!(ids(&tracker), vec!["a", "b"]);
    }

    #[test]
    fn cap_evicts_oldest() {
        let mut tracker = RecencyTracker::new(Arc::new(MemoryStorage::new()), "k", 2);
        for id in ["a", "b", "c"] {
            tracker.add(&cmd(id));
        }
        assert_eq!(ids(&tracker), vec!["c", "b"]);
    }

    #[test]
    fn persists_and_reloads() {
        let storage = Arc::new(MemoryStorage::new());
        let mut tracker = RecencyTracker::new(storage.clone(), "k", 5);
        tracker.add(&cmd("a"));
        tracker.add(&cmd("b"));

        let reloaded = RecencyTracker::new(storage, "k", 5);
        assert_eq!(ids(&reloaded), vec!["b", "a"]);
    }

    #[test]
    fn reload_truncates_to_new_cap() {
        let storage = Arc::new(MemoryStorage::new());
        let mut tracker = RecencyTracker::new(storage.clone(), "k", 5);
        for id in ["a", "b", "c"] {
            tracker.add(&cmd(id));
        }
        let reloaded = RecencyTracker::new(storage, "k", 1);
        assert_eq!(ids(&reloaded), vec!["c"]);
    }

    #[test]
    fn garbage_payload_starts_empty() {
        let storage = MemoryStorage::with_entries([StoredEntry::new("k", 1, b"{nope".to_vec())]);
        let tracker = RecencyTracker::new(Arc::new(storage), "k", 5);
        assert!(tracker.items().is_empty());
    }

    #[test]
    fn version_mismatch_starts_empty() {
        let storage = MemoryStorage::with_entries([StoredEntry::new("k", 99, b"[]".to_vec())]);
        let tracker = RecencyTracker::new(Arc::new(storage), "k", 5);
        assert!(tracker.items().is_empty());
    }

    #[test]
    fn broken_storage_degrades() {
        let mut tracker = RecencyTracker::new(Arc::new(Broken), "k", 5);
        assert!(tracker.items().is_empty());
        tracker.add(&cmd("a"));
        assert_eq!(ids(&tracker), vec!["a"]);
    }
}
