//! # Storage Traits
//!
//! The storage port the stores are written against. Values are opaque text;
//! callers decide the encoding (JSON for every record today).

use anyhow::Result;
use async_trait::async_trait;

/// Trait defining the interface for key-value persistence
///
/// Implementations must apply `set_many` and `remove_many` atomically: a
/// concurrent reader sees either none or all of the entries.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Store several entries as one write
    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove several keys as one write
    async fn remove_many(&self, keys: &[&str]) -> Result<()>;

    /// List every key starting with `prefix`, in ascending order
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
