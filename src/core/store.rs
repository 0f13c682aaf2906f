//! Key-value storage abstractions
use anyhow::Result;
use std::sync::Arc;

/// A named collection of byte keys and values.
pub trait KeyValueCollection: Send + Sync {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;
    fn remove(&self, key: &[u8]) -> Result<()>;
}

/// Hands out collections by name, either kept in memory or persisted.
pub trait Store: Send + Sync {
    /// Returns `None` when a persistent collection was requested but the
    /// backing storage is unavailable.
    fn get_collection(&self, name: &str, persist: bool) -> Option<Arc<dyn KeyValueCollection>>;

    fn remove_collection(&self, name: &str) -> bool;
}
