#![warn(missing_docs)]
//! # phishguard-history
//!
//! ## Purpose
//! Persists the bounded scan history and the UI theme preference.
//!
//! ## Responsibilities
//! - Abstract durable local state behind [`KeyValueStore`].
//! - Provide an in-memory store for tests and a file-backed store for the app.
//! - Keep at most [`HISTORY_CAPACITY`] entries, evicting the oldest first.
//! - Treat missing or corrupt persisted state as empty.
//!
//! ## Data flow
//! Successful single-URL analysis -> [`HistoryStore::append`] -> JSON array
//! under [`HISTORY_KEY`] -> [`HistoryStore::list`] for display.
//!
//! ## Ownership and lifetimes
//! Stores are shared as `Arc<dyn KeyValueStore>` so history and theme
//! preference can use one backing store.
//!
//! ## Error model
//! Write failures return [`HistoryError`]. Read failures and corrupt values
//! are logged and read as empty/default, never surfaced.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub use phishguard_core::Theme;

use phishguard_core::{HISTORY_CAPACITY, HistoryEntry};
use thiserror::Error;
use tracing::{debug, warn};

/// Persisted key for the scan history array.
pub const HISTORY_KEY: &str = "scanHistory";

/// Persisted key for the theme preference.
pub const THEME_KEY: &str = "theme";

/// Durable string key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value for `key`, `None` when absent.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`; removing an absent key succeeds.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store used in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// File-backed store keeping one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) the store directory.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Returns the store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        // Readers never observe a partially written value.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|source| StoreError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| StoreError::Io { path, source })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// Capacity-bounded, append-only scan history.
#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    /// Creates a history view over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Appends one entry, evicting the oldest insertion beyond capacity.
    ///
    /// # Errors
    /// Returns [`HistoryError`] when the updated history cannot be persisted.
    pub fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut entries = self.load();
        entries.push(entry);
        if entries.len() > HISTORY_CAPACITY {
            let overflow = entries.len() - HISTORY_CAPACITY;
            entries.drain(..overflow);
            debug!(evicted = overflow, "history capacity reached");
        }

        let encoded = serde_json::to_string(&entries)?;
        self.store.set(HISTORY_KEY, &encoded)?;
        Ok(())
    }

    /// Returns entries most recent first, at most [`HISTORY_CAPACITY`].
    pub fn list(&self) -> Vec<HistoryEntry> {
        self.load()
            .into_iter()
            .rev()
            .take(HISTORY_CAPACITY)
            .collect()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.load().len()
    }

    /// Returns `true` when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries.
    ///
    /// # Errors
    /// Returns [`HistoryError::Store`] when the key cannot be removed.
    pub fn clear(&self) -> Result<(), HistoryError> {
        self.store.remove(HISTORY_KEY)?;
        Ok(())
    }

    /// Loads entries in insertion order; unreadable state reads as empty.
    fn load(&self) -> Vec<HistoryEntry> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                warn!(%error, "history unreadable, treating as empty");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|error| {
            warn!(%error, "history corrupt, treating as empty");
            Vec::new()
        })
    }
}

/// Persisted theme preference.
#[derive(Clone)]
pub struct ThemePreference {
    store: Arc<dyn KeyValueStore>,
}

impl ThemePreference {
    /// Creates a preference view over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current theme, defaulting to dark.
    pub fn load(&self) -> Theme {
        match self.store.get(THEME_KEY) {
            Ok(Some(raw)) => Theme::parse(&raw),
            Ok(None) => Theme::default(),
            Err(error) => {
                warn!(%error, "theme unreadable, using default");
                Theme::default()
            }
        }
    }

    /// Persists `theme`.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the value cannot be written.
    pub fn save(&self, theme: Theme) -> Result<(), StoreError> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    /// Flips and persists the theme, returning the new value.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the value cannot be written.
    pub fn toggle(&self) -> Result<Theme, StoreError> {
        let next = self.load().toggled();
        self.save(next)?;
        Ok(next)
    }
}

/// Key-value storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key contains characters the backing store cannot represent.
    #[error("invalid store key: {0}")]
    InvalidKey(String),
    /// Filesystem failure.
    #[error("store io failure at {}: {source}", path.display())]
    Io {
        /// Affected path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// In-memory lock was poisoned.
    #[error("store lock poisoned")]
    Poisoned,
}

/// History persistence errors.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Backing store failure.
    #[error("history store failure: {0}")]
    Store(#[from] StoreError),
    /// History could not be encoded.
    #[error("history encode failure: {0}")]
    Encode(#[from] serde_json::Error),
}
