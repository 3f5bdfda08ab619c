use crate::error::{HarvestError, HarvestResult};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fs;
use std::sync::{Mutex, PoisonError};

/// Per-avatar key/value persistence for configuration blobs.
pub trait SettingsStore {
    /// Stored blob for `key`, or `None` when nothing was saved yet.
    fn load(&self, key: &str) -> HarvestResult<Option<String>>;

    fn save(&self, key: &str, blob: &str) -> HarvestResult<()>;
}

/// One YAML file per key under `<data_dir>/<avatar>/`.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    dir: Utf8PathBuf,
}

impl FileSettingsStore {
    pub fn new<P: AsRef<Utf8Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Store scoped to one avatar, so two characters never share a configuration.
    pub fn for_avatar<P: AsRef<Utf8Path>>(data_dir: P, avatar: &str) -> Self {
        Self::new(data_dir.as_ref().join(avatar))
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Utf8PathBuf {
        self.dir.join(format!("{key}.yaml"))
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self, key: &str) -> HarvestResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let blob = fs::read_to_string(&path).map_err(|source| HarvestError::Storage {
            key: key.to_string(),
            source,
        })?;
        tracing::debug!("Read {} bytes from {}", blob.len(), path);
        Ok(Some(blob))
    }

    fn save(&self, key: &str, blob: &str) -> HarvestResult<()> {
        let storage_error = |source| HarvestError::Storage {
            key: key.to_string(),
            source,
        };

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(storage_error)?;
        }
        fs::write(self.path_for(key), blob).map_err(storage_error)
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, blob: &str) -> Self {
        let store = Self::new();
        store.insert(key, blob);
        store
    }

    fn insert(&self, key: &str, blob: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), blob.to_string());
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self, key: &str) -> HarvestResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn save(&self, key: &str, blob: &str) -> HarvestResult<()> {
        self.insert(key, blob);
        Ok(())
    }
}
