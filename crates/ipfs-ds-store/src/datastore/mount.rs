//! Mount datastore: routes keys to child datastores by prefix
//!
//! A default repository keeps blocks under `/blocks` in one datastore and
//! everything else under `/` in another. The mount datastore picks the
//! child whose mountpoint is the longest ancestor of the key and hands it
//! the key with that mountpoint stripped.

use crate::datastore::Datastore;
use crate::error::{Result, StoreError};
use crate::key::Key;
use bytes::Bytes;

/// Prefix-routing datastore over a set of children
///
/// # Example
///
/// ```rust,ignore
/// use ipfs_ds_store::{Key, MemoryDatastore, MountDatastore};
///
/// let blocks = MemoryDatastore::new();
/// let rest = MemoryDatastore::new();
/// let ds = MountDatastore::new(vec![
///     (Key::new("/blocks"), blocks),
///     (Key::root(), rest),
/// ]);
/// // "/blocks/CIQA" is stored in `blocks` as "/CIQA"
/// ```
#[derive(Debug, Clone)]
pub struct MountDatastore<D: Datastore> {
    mounts: Vec<(Key, D)>,
}

impl<D: Datastore> MountDatastore<D> {
    /// Create a mount datastore
    ///
    /// Mounts are ordered longest-first so lookups find the most specific one.
    pub fn new(mut mounts: Vec<(Key, D)>) -> Self {
        mounts.sort_by(|(a, _), (b, _)| {
            b.segments()
                .count()
                .cmp(&a.segments().count())
                .then_with(|| a.cmp(b))
        });
        Self { mounts }
    }

    /// Mountpoints, most specific first
    pub fn mountpoints(&self) -> impl Iterator<Item = &Key> {
        self.mounts.iter().map(|(k, _)| k)
    }

    /// Child datastore and child-relative key for `key`
    pub fn lookup(&self, key: &Key) -> Result<(&D, Key)> {
        self.mounts
            .iter()
            .find_map(|(mountpoint, ds)| key.strip_ancestor(mountpoint).map(|rest| (ds, rest)))
            .ok_or_else(|| StoreError::no_mount(key))
    }
}

impl<D: Datastore + Sync> Datastore for MountDatastore<D> {
    async fn get(&self, key: &Key) -> Result<Option<Bytes>> {
        let (ds, child_key) = self.lookup(key)?;
        ds.get(&child_key).await
    }

    async fn put(&self, key: &Key, value: &[u8]) -> Result<()> {
        let (ds, child_key) = self.lookup(key)?;
        ds.put(&child_key, value).await
    }

    async fn has(&self, key: &Key) -> Result<bool> {
        let (ds, child_key) = self.lookup(key)?;
        ds.has(&child_key).await
    }

    async fn delete(&self, key: &Key) -> Result<()> {
        let (ds, child_key) = self.lookup(key)?;
        ds.delete(&child_key).await
    }

    async fn sync(&self) -> Result<()> {
        for (_, ds) in &self.mounts {
            ds.sync().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::MemoryDatastore;
    use crate::error::StoreErrorKind;

    fn two_mounts() -> (MountDatastore<MemoryDatastore>, MemoryDatastore, MemoryDatastore) {
        let blocks = MemoryDatastore::new();
        let rest = MemoryDatastore::new();
        let ds = MountDatastore::new(vec![
            (Key::root(), rest.clone()),
            (Key::new("/blocks"), blocks.clone()),
        ]);
        (ds, blocks, rest)
    }

    #[tokio::test]
    async fn test_routes_to_longest_prefix() {
        let (ds, blocks, rest) = two_mounts();

        ds.put(&Key::new("/blocks/CIQA"), b"block").await.unwrap();
        ds.put(&Key::new("/local/filesroot"), b"root").await.unwrap();

        assert_eq!(blocks.keys(), vec![Key::new("/CIQA")]);
        assert_eq!(rest.keys(), vec![Key::new("/local/filesroot")]);
        assert_eq!(
            ds.get(&Key::new("/blocks/CIQA")).await.unwrap().as_deref(),
            Some(&b"block"[..])
        );
        assert!(ds.has(&Key::new("/local/filesroot")).await.unwrap());
    }

    #[tokio::test]
    async fn test_sibling_prefix_not_matched() {
        let (ds, blocks, rest) = two_mounts();

        ds.put(&Key::new("/blocksx"), b"v").await.unwrap();
        assert!(blocks.is_empty());
        assert_eq!(rest.keys(), vec![Key::new("/blocksx")]);
    }

    #[tokio::test]
    async fn test_no_mount() {
        let ds = MountDatastore::new(vec![(Key::new("/blocks"), MemoryDatastore::new())]);

        let err = ds.get(&Key::new("/local/x")).await.unwrap_err();
        assert_eq!(err.kind(), &StoreErrorKind::NoMount);
        assert_eq!(
            ds.mountpoints().cloned().collect::<Vec<_>>(),
            vec![Key::new("/blocks")]
        );
    }
}
