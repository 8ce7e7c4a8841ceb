use crate::errors::ApiError;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};
use tokio::fs;
use tracing::{debug, error};

/// Durable string key/value document, written through to a JSON file on every
/// change. Clones share the same underlying map.
#[derive(Debug, Clone)]
pub struct KeyValueStore {
    path: Option<PathBuf>,
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl KeyValueStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Arc::default(),
        }
    }

    /// Loads the document at `path`. A missing or unreadable file starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path).await;
        Self {
            path: Some(path),
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_empty())
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), ApiError> {
        let mut entries = self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.into());
        self.persist(&entries)
    }

    /// Removes every key in `keys` with a single write.
    pub fn remove_all(&self, keys: &[&str]) -> Result<(), ApiError> {
        let mut entries = self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = entries.len();
        for key in keys {
            entries.remove(*key);
        }
        if entries.len() == before {
            return Ok(());
        }
        self.persist(&entries)
    }

    pub fn remove(&self, key: &str) -> Result<(), ApiError> {
        self.remove_all(&[key])
    }

    // Blocking on purpose: callers read the file right after a write, and the
    // write guard held by the caller keeps concurrent writes in order.
    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), ApiError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(entries)?;
        std::fs::write(path, payload)?;
        debug!("persisted {} session keys to {}", entries.len(), path.display());
        Ok(())
    }
}

async fn load_entries(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse session file: {err}");
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read session file: {err}");
            BTreeMap::new()
        }
    }
}
