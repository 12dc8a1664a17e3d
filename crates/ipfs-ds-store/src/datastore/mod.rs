//! Key-value datastore abstraction for repository contents

use crate::error::Result;
use crate::key::Key;
use bytes::Bytes;

/// Async key-value datastore
///
/// Maps cleaned path [`Key`]s to opaque byte values. Implementations:
/// - In-memory BTreeMap ([`MemoryDatastore`])
/// - One file per key on disk ([`FlatfsDatastore`])
/// - LevelDB ([`LeveldbDatastore`])
/// - Prefix routing over other datastores ([`MountDatastore`])
///
/// The trait uses `trait_variant` so every returned future is `Send`.
///
/// # Example
///
/// ```rust,ignore
/// use ipfs_ds_store::{Datastore, Key, MemoryDatastore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let ds = MemoryDatastore::new();
/// let key = Key::new("/local/filesroot");
///
/// ds.put(&key, b"hello world").await?;
/// assert_eq!(ds.get(&key).await?.as_deref(), Some(&b"hello world"[..]));
/// # Ok(())
/// # }
/// ```
#[trait_variant::make(Send)]
pub trait Datastore {
    /// Get the value stored under `key`
    ///
    /// Returns `None` if the key is not present.
    async fn get(&self, key: &Key) -> Result<Option<Bytes>>;

    /// Store `value` under `key`, replacing any previous value
    async fn put(&self, key: &Key, value: &[u8]) -> Result<()>;

    /// Check if a key exists without reading its value
    async fn has(&self, key: &Key) -> Result<bool>;

    /// Remove a key
    ///
    /// Removing an absent key is not an error.
    async fn delete(&self, key: &Key) -> Result<()>;

    /// Flush any buffered writes to durable storage
    async fn sync(&self) -> Result<()>;
}

pub mod any;
pub mod flatfs;
pub mod leveldb;
pub mod memory;
pub mod mount;

pub use any::{Backend, RepoDatastore};
pub use flatfs::{FlatfsDatastore, ShardFn};
pub use leveldb::LeveldbDatastore;
pub use memory::MemoryDatastore;
pub use mount::MountDatastore;
