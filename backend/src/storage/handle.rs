use anyhow::{Context, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::memory::MemoryStorage;
use super::traits::KeyValueStorage;

/// Shared handle to the storage port used by every store
///
/// Adds JSON encoding on top of the raw port plus a per-key lock registry.
/// Read-modify-write sequences take the key's lock so two stores (or two tasks
/// of the same store) cannot interleave on the same persisted list.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStorage>,
    key_locks: Arc<KeyLocks>,
}

type KeyLocks = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

fn lock_registry(locks: &KeyLocks) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
    match locks.lock() {
        Ok(locks) => locks,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Exclusive hold on one storage key, released on drop
pub struct KeyGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: String,
    locks: Arc<KeyLocks>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        let mut locks = lock_registry(&self.locks);
        self.guard.take();
        // Waiters hold a clone of the Arc, so a count of one means only the registry is left
        if locks.get(&self.key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&self.key);
        }
    }
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            backend,
            key_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Storage over a fresh in-memory namespace
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Acquire exclusive access to a key for a read-modify-write sequence
    ///
    /// The key's entry leaves the registry once its last holder or waiter is
    /// gone, so the registry only tracks keys currently in use.
    pub async fn lock_key(&self, key: &str) -> KeyGuard {
        let lock = {
            let mut locks = lock_registry(&self.key_locks);
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        KeyGuard {
            guard: Some(lock.lock_owned().await),
            key: key.to_string(),
            locks: self.key_locks.clone(),
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        lock_registry(&self.key_locks).len()
    }

    /// Read and decode a JSON value. A present but undecodable value is an error.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(key).await? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("Stored value under '{}' is malformed", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Read a JSON list, treating a missing key as empty
    pub async fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(self.read_json(key).await?.unwrap_or_default())
    }

    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("Failed to encode value for '{}'", key))?;
        self.backend.set(key, raw).await?;
        debug!("Persisted '{}'", key);
        Ok(())
    }

    /// Run a read-modify-write over a JSON list under the key's lock
    ///
    /// The closure sees the persisted list, not a cache. The list is written
    /// back only when the closure succeeds; the final list is returned.
    pub async fn update_list<T, R, F>(&self, key: &str, change: F) -> Result<(Vec<T>, R)>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let _guard = self.lock_key(key).await;
        let mut list: Vec<T> = self.read_list(key).await?;
        let outcome = change(&mut list)?;
        self.write_json(key, &list).await?;
        Ok((list, outcome))
    }

    pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.backend.get(key).await
    }

    pub async fn set_many(&self, entries: Vec<(String, String)>) -> Result<()> {
        self.backend.set_many(entries).await
    }

    pub async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.backend.remove_many(keys).await
    }

    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.backend.keys_with_prefix(prefix).await
    }
}
