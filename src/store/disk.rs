use crate::core::store::KeyValueCollection;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionHandle, PersistMode};
use tracing::debug;

/// Collection persisted in a fjall partition.
pub struct DiskCollection {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Keyspace, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }

    fn sync(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist keyspace")
    }
}

impl KeyValueCollection for DiskCollection {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.partition.get(key) {
            Ok(Some(value)) => {
                debug!("Disk HIT for key: {}", String::from_utf8_lossy(key));
                Some(value.to_vec())
            }
            Ok(None) => {
                debug!("Disk MISS for key: {}", String::from_utf8_lossy(key));
                None
            }
            Err(e) => {
                debug!("DiskCollection get error: {}", e);
                None
            }
        }
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.partition
            .insert(key, value)
            .with_context(|| format!("Failed to write key: {}", String::from_utf8_lossy(key)))?;
        self.sync()?;
        debug!("Disk PUT for key: {}", String::from_utf8_lossy(key));
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> Result<()> {
        self.partition
            .remove(key)
            .with_context(|| format!("Failed to remove key: {}", String::from_utf8_lossy(key)))?;
        self.sync()?;
        debug!("Disk REMOVE for key: {}", String::from_utf8_lossy(key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::PartitionCreateOptions;
    use tempfile::tempdir;

    fn open(path: &std::path::Path) -> DiskCollection {
        let keyspace = fjall::Config::new(path).open().unwrap();
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        DiskCollection::new(keyspace, partition)
    }

    #[test]
    fn test_disk_get_put_remove() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        assert!(collection.get(b"key1").is_none());

        collection.put(b"key1", b"123").unwrap();
        assert_eq!(collection.get(b"key1"), Some(b"123".to_vec()));

        collection.remove(b"key1").unwrap();
        assert!(collection.get(b"key1").is_none());
    }

    #[test]
    fn test_disk_values_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let collection = open(dir.path());
            collection.put(b"key1", b"42.5").unwrap();
        }

        let collection = open(dir.path());
        assert_eq!(collection.get(b"key1"), Some(b"42.5".to_vec()));
    }
}
