//! Namespaced key-value persistence.
//!
//! Every key is stored as `mlg_<key>` with a JSON-serialized value, in a
//! single JSON document on disk (`.mlg/storage.json` under the project root
//! by default). Reads never fail: a missing or undecodable value yields the
//! caller's default. Writes reach memory only after they reach disk.

use crate::{debug, log};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix applied to every stored key.
pub const NAMESPACE: &str = "mlg_";

/// Default storage file, relative to the project root.
pub const STORAGE_FILE: &str = ".mlg/storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to serialize `{key}`")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

/// Persistent store scoped under [`NAMESPACE`].
///
/// Values are kept as serialized strings, the same shape a browser's
/// local storage holds them in.
pub struct PersistentStore {
    path: Option<PathBuf>,
    entries: Mutex<IndexMap<String, String>>,
}

impl PersistentStore {
    /// Open (or start) the store backed by `path`.
    ///
    /// A corrupt file is reported and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log!("warning"; "ignoring unreadable storage {}: {}", path.display(), e);
                IndexMap::new()
            }),
            Err(_) => IndexMap::new(),
        };
        debug!("storage"; "opened {} ({} keys)", path.display(), entries.len());

        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read `key`, falling back to `default` when absent or undecodable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_opt(key).unwrap_or(default)
    }

    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.lock();
        let raw = entries.get(&namespaced(key))?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log!("warning"; "stored `{}` is invalid: {}", key, e);
                None
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;

        let mut entries = self.entries.lock();
        let mut updated = entries.clone();
        updated.insert(namespaced(key), raw);
        self.flush(&updated)?;
        *entries = updated;
        Ok(())
    }

    /// Remove `key`. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        let mut updated = entries.clone();
        if updated.shift_remove(&namespaced(key)).is_none() {
            return Ok(());
        }
        self.flush(&updated)?;
        *entries = updated;
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(&namespaced(key))
    }

    /// Stored keys without the namespace prefix.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .keys()
            .filter_map(|k| k.strip_prefix(NAMESPACE))
            .map(str::to_string)
            .collect()
    }

    fn flush(&self, entries: &IndexMap<String, String>) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let io_err = |e| StorageError::Io(path.clone(), e);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::Serialize {
                key: String::from("*"),
                source,
            }
        })?;

        // Write then rename so a crash never leaves half a file behind.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)
    }
}

fn namespaced(key: &str) -> String {
    format!("{NAMESPACE}{key}")
}
