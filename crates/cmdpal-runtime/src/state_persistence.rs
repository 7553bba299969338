//! Keyed state storage for palette persistence.
//!
//! The palette persists small blobs (the recent-commands list) under a
//! string key. This module defines the [`StorageBackend`] boundary and the
//! stock backends.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  RecencyTracker (widgets)                     │
//! │   - encodes its list as JSON                                  │
//! │   - reads once on creation, writes after every update         │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     StorageBackend                            │
//! │   - MemoryStorage: in-memory (testing, ephemeral)             │
//! │   - FileStorage: JSON file (requires state-persistence)       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: Storage failures never panic; operations return `Result`.
//! 2. **Atomic writes**: File storage uses write-rename pattern to prevent corruption.
//! 3. **Key isolation**: Storing one key never disturbs another.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returns error, nothing written |
//! | `StorageError::Serialization` | JSON encode/decode | Load errors; store rewrites |
//! | `StorageError::Corruption` | Lock poisoned, bad format | Returns error |
//! | Missing entry | First run, key changed | `Ok(None)` |

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during state storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    Serialization(String),
    /// Storage is corrupted or in an invalid format.
    Corruption(String),
    /// Backend is not available.
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(_)
            | StorageError::Corruption(_)
            | StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A stored blob with version metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredEntry {
    /// Storage key.
    pub key: String,
    /// Schema version chosen by the writer.
    pub version: u32,
    /// Serialized payload.
    pub data: Vec<u8>,
}

impl StoredEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(key: impl Into<String>, version: u32, data: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            version,
            data,
        }
    }
}

/// Trait for pluggable key-value storage backends.
///
/// Implementations must be thread-safe (`Send + Sync`) so one backend can be
/// shared between several palettes.
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Load the entry stored under `key`. `Ok(None)` if absent.
    fn load(&self, key: &str) -> StorageResult<Option<StoredEntry>>;

    /// Store `entry`, replacing any entry with the same key.
    fn store(&self, entry: StoredEntry) -> StorageResult<()>;

    /// Remove the entry under `key`, if any.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load(&self, key: &str) -> StorageResult<Option<StoredEntry>> {
        (**self).load(key)
    }

    fn store(&self, entry: StoredEntry) -> StorageResult<()> {
        (**self).store(entry)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory storage backend for testing and ephemeral state.
///
/// State is lost when the process exits.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, StoredEntry>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create memory storage pre-populated with entries.
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = StoredEntry>) -> Self {
        let data = entries.into_iter().map(|e| (e.key.clone(), e)).collect();
        Self {
            data: RwLock::new(data),
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().map(|g| g.len()).unwrap_or(0)
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn load(&self, key: &str) -> StorageResult<Option<StoredEntry>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn store(&self, entry: StoredEntry) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.insert(entry.key.clone(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.remove(key);
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("entries", &self.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage (requires state-persistence feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "state-persistence")]
mod file_storage {
    use super::*;
    use base64::Engine;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// File format for stored state (JSON).
    #[derive(Serialize, Deserialize)]
    struct StateFile {
        /// Format version for future migrations.
        format_version: u32,
        /// Map of key -> entry.
        entries: HashMap<String, FileEntry>,
    }

    /// Serialized entry in the state file.
    #[derive(Serialize, Deserialize)]
    struct FileEntry {
        version: u32,
        /// Base64-encoded data for binary safety.
        data_base64: String,
    }

    impl StateFile {
        const FORMAT_VERSION: u32 = 1;

        fn new() -> Self {
            Self {
                format_version: Self::FORMAT_VERSION,
                entries: HashMap::new(),
            }
        }
    }

    /// File-based storage backend using JSON.
    ///
    /// All keys live in one JSON file. Every `store`/`remove` rewrites the
    /// file through a temporary file and an atomic rename.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "entries": {
    ///     "cmdpal-recent": {
    ///       "version": 1,
    ///       "data_base64": "W3siaWQiOiJvcGVuIn1d"
    ///     }
    ///   }
    /// }
    /// ```
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// Create a file storage at the given path.
        ///
        /// The file does not need to exist; it will be created on first store.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// Path of the backing file.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        fn read_file(&self) -> StorageResult<StateFile> {
            if !self.path.exists() {
                return Ok(StateFile::new());
            }
            let reader = BufReader::new(File::open(&self.path)?);
            let state_file: StateFile = serde_json::from_reader(reader).map_err(|e| {
                StorageError::Serialization(format!("failed to parse state file: {e}"))
            })?;
            if state_file.format_version != StateFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = state_file.format_version,
                    expected = StateFile::FORMAT_VERSION,
                    "state file format version mismatch, ignoring stored state"
                );
                return Ok(StateFile::new());
            }
            Ok(state_file)
        }

        fn write_file(&self, state_file: &StateFile) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }

            let tmp_path = self.temp_path();
            {
                let mut writer = BufWriter::new(File::create(&tmp_path)?);
                serde_json::to_writer_pretty(&mut writer, state_file).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize state: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                path = %self.path.display(),
                entries = state_file.entries.len(),
                "saved palette state"
            );
            Ok(())
        }
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn load(&self, key: &str) -> StorageResult<Option<StoredEntry>> {
            let mut state_file = self.read_file()?;
            let Some(entry) = state_file.entries.remove(key) else {
                return Ok(None);
            };
            let data = base64::engine::general_purpose::STANDARD
                .decode(&entry.data_base64)
                .map_err(|e| StorageError::Corruption(format!("bad entry {key}: {e}")))?;
            Ok(Some(StoredEntry {
                key: key.to_string(),
                version: entry.version,
                data,
            }))
        }

        /// Replaces the entry under `entry.key`. An unreadable state file is
        /// discarded and rewritten with only this entry.
        fn store(&self, entry: StoredEntry) -> StorageResult<()> {
            let mut state_file = self.read_file().unwrap_or_else(|error| {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    "state file unreadable, replacing it"
                );
                StateFile::new()
            });
            state_file.entries.insert(
                entry.key,
                FileEntry {
                    version: entry.version,
                    data_base64: base64::engine::general_purpose::STANDARD.encode(&entry.data),
                },
            );
            self.write_file(&state_file)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            let mut state_file = self.read_file()?;
            if state_file.entries.remove(key).is_some() {
                self.write_file(&state_file)?;
            }
            Ok(())
        }
    }

    impl fmt::Debug for FileStorage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStorage")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use file_storage::FileStorage;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        storage
            .store(StoredEntry::new("recent", 1, b"[]".to_vec()))
            .unwrap();
        let loaded = storage.load("recent").unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.data, b"[]");
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn memory_missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert!(storage.load("nope").unwrap().is_none());
    }

    #[test]
    fn memory_store_replaces_and_isolates_keys() {
        let storage = MemoryStorage::with_entries([
            StoredEntry::new("a", 1, vec![1]),
            StoredEntry::new("b", 1, vec![2]),
        ]);
        storage.store(StoredEntry::new("a", 2, vec![9])).unwrap();
        assert_eq!(storage.load("a").unwrap().unwrap().data, vec![9]);
        assert_eq!(storage.load("b").unwrap().unwrap().data, vec![2]);

        storage.remove("a").unwrap();
        assert!(storage.load("a").unwrap().is_none());
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn arc_backend_shares_state() {
        let shared = Arc::new(MemoryStorage::new());
        let handle: Box<dyn StorageBackend> = Box::new(Arc::clone(&shared));
        handle.store(StoredEntry::new("k", 1, vec![7])).unwrap();
        assert_eq!(shared.load("k").unwrap().unwrap().data, vec![7]);
        assert_eq!(handle.name(), "MemoryStorage");
    }

    #[test]
    fn error_display() {
        let err = StorageError::Unavailable("read-only".into());
        assert_eq!(err.to_string(), "storage unavailable: read-only");
        let io: StorageError = std::io::Error::other("boom").into();
        assert!(std::error::Error::source(&io).is_some());
    }
}
