//! Key/value persistence for session state.
//!
//! The console keeps three values across runs: the bearer token, the signed-in
//! user (as JSON) and the theme preference. Backends implement [`Storage`];
//! [`FileStorage`] keeps them in one JSON file under the data directory.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Storage key of the signed-in user, stored as JSON.
pub const USER_KEY: &str = "user";

/// Storage key of the theme preference.
pub const THEME_KEY: &str = "theme";

/// Default storage file name within the data directory.
pub const STORAGE_FILE: &str = "session.json";

/// A string key/value store.
pub trait Storage: Send + Sync + fmt::Debug {
    /// Read a value. Missing keys read as `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

// ============================================================================
// MemoryStorage
// ============================================================================

/// Process-local storage, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with `entries`.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

// ============================================================================
// FileStorage
// ============================================================================

/// Storage backed by a JSON object file.
///
/// The whole map is held in memory and rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the default storage file inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::open(data_dir.join(STORAGE_FILE))
    }

    /// Open a storage file at `path`.
    ///
    /// A missing file starts empty. An unreadable or malformed file is
    /// logged and also starts empty; it is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring malformed session file");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read session file");
                BTreeMap::new()
            }
        };

        Self {
            path,
            values: RwLock::new(values),
        }
    }

    /// Get the storage file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), keys = values.len(), "Session file written");
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write();
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&values)
    }
}
