use crate::core::store::KeyValueCollection;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Collection that lives only as long as the process.
#[derive(Default)]
pub struct MemoryCollection {
    inner: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueCollection for MemoryCollection {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let entries = self.inner.read().ok()?;
        let value = entries.get(key).cloned();
        if value.is_some() {
            debug!("Memory HIT for key: {}", String::from_utf8_lossy(key));
        } else {
            debug!("Memory MISS for key: {}", String::from_utf8_lossy(key));
        }
        value
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut entries = self
            .inner
            .write()
            .map_err(|_| anyhow!("Memory collection lock poisoned"))?;
        entries.insert(key.to_vec(), value.to_vec());
        debug!("Memory PUT for key: {}", String::from_utf8_lossy(key));
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> Result<()> {
        let mut entries = self
            .inner
            .write()
            .map_err(|_| anyhow!("Memory collection lock poisoned"))?;
        entries.remove(key);
        debug!("Memory REMOVE for key: {}", String::from_utf8_lossy(key));
        Ok(())
    }
}
