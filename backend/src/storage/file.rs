//! # File Storage
//!
//! Persists the whole key-value namespace as one JSON document,
//! `storage.json`, inside the data directory.
//!
//! ```text
//! data/
//! ├── studio_config.yaml   (optional, see config)
//! └── storage.json         ← This module manages this file
//! ```
//!
//! Every mutation is applied to a copy of the map, written to a temp file and
//! renamed into place. Only after the rename succeeds does the in-memory copy
//! change, so a failed write leaves both copies untouched.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::traits::KeyValueStorage;

const STORAGE_FILE_NAME: &str = "storage.json";

/// File-backed key-value storage
#[derive(Clone)]
pub struct FileStorage {
    path: PathBuf,
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl FileStorage {
    /// Open (or create) the storage file inside `base_directory`
    pub fn open<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
            info!("Created data directory: {}", base_path.display());
        }

        let path = base_path.join(STORAGE_FILE_NAME);
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Storage file {} is not valid JSON", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened file storage at {:?} with {} keys", path, entries.len());

        Ok(Self {
            path,
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    /// Path of the JSON snapshot
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply a change to a copy of the map, persist it, then commit it
    fn mutate<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("File storage lock poisoned"))?;

        let mut updated = entries.clone();
        change(&mut updated);
        self.write_snapshot(&updated)?;
        *entries = updated;
        Ok(())
    }

    fn write_snapshot(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)?;

        // Atomic write using temp file
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!("Saved {} keys to {:?}", entries.len(), self.path);
        Ok(())
    }

    fn snapshot(&self) -> Result<BTreeMap<String, String>> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|_| anyhow::anyhow!("File storage lock poisoned"))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("File storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    async fn set_many(&self, new_entries: Vec<(String, String)>) -> Result<()> {
        self.mutate(|entries| entries.extend(new_entries))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.mutate(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .snapshot()?
            .into_keys()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }
}
