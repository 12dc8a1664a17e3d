//! In-memory datastore implementation

use crate::datastore::Datastore;
use crate::error::Result;
use crate::key::Key;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// In-memory datastore using BTreeMap
///
/// Backs the `mem` datastore spec type and is handy in tests. Nothing is
/// persisted: contents vanish when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct MemoryDatastore {
    entries: Arc<RwLock<BTreeMap<Key, Bytes>>>,
}

impl MemoryDatastore {
    /// Create new empty memory datastore
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Get number of entries stored
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Check if datastore is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// All keys currently stored, in order
    pub fn keys(&self) -> Vec<Key> {
        self.entries.read().unwrap().keys().cloned().collect()
    }
}

impl Default for MemoryDatastore {
    fn default() -> Self {
        Self::new()
    }
}

impl Datastore for MemoryDatastore {
    async fn get(&self, key: &Key) -> Result<Option<Bytes>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &Key, value: &[u8]) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.clone(), Bytes::copy_from_slice(value));
        Ok(())
    }

    async fn has(&self, key: &Key) -> Result<bool> {
        Ok(self.entries.read().unwrap().contains_key(key))
    }

    async fn delete(&self, key: &Key) -> Result<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }

    async fn sync(&self) -> Result<()> {
        Ok(())
    }
}
