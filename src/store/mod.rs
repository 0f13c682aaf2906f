pub mod disk;
pub mod memory;

use crate::core::store::{KeyValueCollection, Store};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::{debug, warn};

/// A thread-safe key-value store that can hold multiple collections.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Keyspace>,
}

impl KeyValueStore {
    /// Opens the store under `data_path`. Persistent collections are
    /// unavailable if the keyspace cannot be opened.
    pub fn open(data_path: &Path) -> Self {
        let store_dir = data_path.join("store");
        let keyspace = match fjall::Config::new(&store_dir).open() {
            Ok(keyspace) => {
                debug!("Opened keyspace at {}", store_dir.display());
                Some(keyspace)
            }
            Err(e) => {
                warn!(
                    "Failed to open keyspace at {}: {}",
                    store_dir.display(),
                    e
                );
                None
            }
        };

        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    /// A store that keeps everything in memory.
    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    /// Returns the requested collection, falling back to an in-memory one
    /// when persistence is unavailable.
    pub fn collection_or_memory(&self, name: &str) -> Arc<dyn KeyValueCollection> {
        self.get_collection(name, true).unwrap_or_else(|| {
            warn!(
                "Persistent collection '{}' unavailable, changes will not be saved",
                name
            );
            self.get_collection(name, false)
                .unwrap_or_else(|| Arc::new(MemoryCollection::new()))
        })
    }

    fn open_collection(&self, name: &str, persist: bool) -> Option<Arc<dyn KeyValueCollection>> {
        if !persist {
            return Some(Arc::new(MemoryCollection::new()));
        }

        let keyspace = self.keyspace.as_ref()?;
        match keyspace.open_partition(name, PartitionCreateOptions::default()) {
            Ok(partition) => Some(Arc::new(DiskCollection::new(keyspace.clone(), partition))),
            Err(e) => {
                warn!("Failed to open partition '{}': {}", name, e);
                None
            }
        }
    }
}

impl Store for KeyValueStore {
    fn get_collection(&self, name: &str, persist: bool) -> Option<Arc<dyn KeyValueCollection>> {
        let key = collection_key(name, persist);
        if let Ok(collections) = self.collections.read()
            && let Some(collection) = collections.get(&key)
        {
            return Some(Arc::clone(collection));
        }

        let mut collections = self.collections.write().ok()?;
        if let Some(collection) = collections.get(&key) {
            return Some(Arc::clone(collection));
        }
        let collection = self.open_collection(name, persist)?;
        collections.insert(key, Arc::clone(&collection));
        Some(collection)
    }

    fn remove_collection(&self, name: &str) -> bool {
        match self.collections.write() {
            Ok(mut collections) => {
                let removed_disk = collections.remove(&collection_key(name, true)).is_some();
                let removed_memory = collections.remove(&collection_key(name, false)).is_some();
                removed_disk || removed_memory
            }
            Err(_) => false,
        }
    }
}

fn collection_key(name: &str, persist: bool) -> String {
    if persist {
        format!("disk:{name}")
    } else {
        format!("memory:{name}")
    }
}
