//! Persisted query storage.
//!
//! A [`QueryStore`] is a fallible string key/value store that survives page
//! reloads (browser local storage, a file, ...). [`PersistedQuery`] binds one
//! key of a store and swallows every failure: a broken store must never stop
//! the filter from working, it only loses the remembered query.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::warn;

/// A string key/value store that outlives the page session.
pub trait QueryStore: Send {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store, mostly for tests and headless embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one value.
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }
}

impl QueryStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key under a base directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `base_path`. The directory is created on
    /// first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.query", key))
    }
}

impl QueryStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::storage("read", key, err)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.base_path).map_err(|e| Error::storage("write", key, e))?;
        fs::write(self.path_for(key), value).map_err(|e| Error::storage("write", key, e))
    }
}

/// The single persisted query of one filter, with failures degraded to
/// "no remembered query".
#[derive(Debug)]
pub struct PersistedQuery<S: QueryStore> {
    store: S,
    key: String,
}

impl<S: QueryStore> PersistedQuery<S> {
    /// Binds `key` of `store`.
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Storage key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the remembered raw query; empty when absent or unreadable.
    pub fn load(&self) -> String {
        match self.store.get(&self.key) {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "could not load persisted query");
                String::new()
            }
        }
    }

    /// Remembers the raw query. Failures are logged and dropped.
    pub fn save(&mut self, value: &str) {
        if let Err(err) = self.store.set(&self.key, value) {
            warn!(key = %self.key, error = %err, "could not persist query");
        }
    }
}
