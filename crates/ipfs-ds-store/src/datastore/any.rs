//! Runtime-selected datastore built from a repository's datastore spec

use crate::datastore::{
    Datastore, FlatfsDatastore, LeveldbDatastore, MemoryDatastore, MountDatastore,
};
use crate::error::Result;
use crate::key::Key;
use bytes::Bytes;

/// A leaf datastore: one that stores values itself
#[derive(Debug, Clone)]
pub enum Backend {
    /// In-memory, discarded on close
    Memory(MemoryDatastore),
    /// One file per key
    Flatfs(FlatfsDatastore),
    /// LevelDB directory
    Leveldb(LeveldbDatastore),
}

/// The datastore of an opened repository
///
/// Either a single backend or a mount over several backends. Mounts do not
/// nest.
#[derive(Debug, Clone)]
pub enum RepoDatastore {
    /// A single backend serving every key
    Single(Backend),
    /// Prefix routing over backends
    Mount(MountDatastore<Backend>),
}

impl Datastore for Backend {
    async fn get(&self, key: &Key) -> Result<Option<Bytes>> {
        match self {
            Backend::Memory(ds) => ds.get(key).await,
            Backend::Flatfs(ds) => ds.get(key).await,
            Backend::Leveldb(ds) => ds.get(key).await,
        }
    }

    async fn put(&self, key: &Key, value: &[u8]) -> Result<()> {
        match self {
            Backend::Memory(ds) => ds.put(key, value).await,
            Backend::Flatfs(ds) => ds.put(key, value).await,
            Backend::Leveldb(ds) => ds.put(key, value).await,
        }
    }

    async fn has(&self, key: &Key) -> Result<bool> {
        match self {
            Backend::Memory(ds) => ds.has(key).await,
            Backend::Flatfs(ds) => ds.has(key).await,
            Backend::Leveldb(ds) => ds.has(key).await,
        }
    }

    async fn delete(&self, key: &Key) -> Result<()> {
        match self {
            Backend::Memory(ds) => ds.delete(key).await,
            Backend::Flatfs(ds) => ds.delete(key).await,
            Backend::Leveldb(ds) => ds.delete(key).await,
        }
    }

    async fn sync(&self) -> Result<()> {
        match self {
            Backend::Memory(ds) => ds.sync().await,
            Backend::Flatfs(ds) => ds.sync().await,
            Backend::Leveldb(ds) => ds.sync().await,
        }
    }
}

impl Datastore for RepoDatastore {
    async fn get(&self, key: &Key) -> Result<Option<Bytes>> {
        match self {
            RepoDatastore::Single(ds) => ds.get(key).await,
            RepoDatastore::Mount(ds) => ds.get(key).await,
        }
    }

    async fn put(&self, key: &Key, value: &[u8]) -> Result<()> {
        match self {
            RepoDatastore::Single(ds) => ds.put(key, value).await,
            RepoDatastore::Mount(ds) => ds.put(key, value).await,
        }
    }

    async fn has(&self, key: &Key) -> Result<bool> {
        match self {
            RepoDatastore::Single(ds) => ds.has(key).await,
            RepoDatastore::Mount(ds) => ds.has(key).await,
        }
    }

    async fn delete(&self, key: &Key) -> Result<()> {
        match self {
            RepoDatastore::Single(ds) => ds.delete(key).await,
            RepoDatastore::Mount(ds) => ds.delete(key).await,
        }
    }

    async fn sync(&self) -> Result<()> {
        match self {
            RepoDatastore::Single(ds) => ds.sync().await,
            RepoDatastore::Mount(ds) => ds.sync().await,
        }
    }
}
