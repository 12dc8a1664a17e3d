//! LevelDB datastore, used by the node for everything outside `/blocks`

use std::path::{Path, PathBuf};

use bytes::Bytes;
use rusty_leveldb::{DB, Options, Status};

use crate::datastore::Datastore;
use crate::error::{Result, StoreError, StoreErrorKind};
use crate::key::Key;

/// Datastore over a LevelDB directory
///
/// Keys are stored as their full path bytes, e.g. `/local/filesroot`.
/// The database is opened on a blocking thread for each operation and closed
/// again afterwards, so its own `LOCK` file is only held while a call runs.
#[derive(Debug, Clone)]
pub struct LeveldbDatastore {
    path: PathBuf,
}

impl LeveldbDatastore {
    /// Open (creating if needed) a LevelDB directory
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created or is not a readable
    /// database.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display())))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&path).await?;
        let ds = Self { path };
        ds.with_db(|_| Ok(())).await?;
        Ok(ds)
    }

    /// Root directory of this datastore
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_db<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut DB) -> std::result::Result<T, Status> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut db = DB::open(&path, Options::default()).map_err(|e| leveldb_error(&path, e))?;
            op(&mut db).map_err(|e| leveldb_error(&path, e))
        })
        .await
        .map_err(|e| StoreError::io(e).with_context("leveldb worker failed"))?
    }
}

fn leveldb_error(path: &Path, status: Status) -> StoreError {
    StoreError::new(StoreErrorKind::Io, Some(status.to_string().into()))
        .with_context(format!("leveldb: {}", path.display()))
}

impl Datastore for LeveldbDatastore {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self), fields(key = %key)))]
    async fn get(&self, key: &Key) -> Result<Option<Bytes>> {
        let key = key.as_str().as_bytes().to_vec();
        self.with_db(move |db| Ok(db.get(&key).map(|v| Bytes::copy_from_slice(&v))))
            .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, value), fields(key = %key, len = value.len())))]
    async fn put(&self, key: &Key, value: &[u8]) -> Result<()> {
        let key = key.as_str().as_bytes().to_vec();
        let value = value.to_vec();
        self.with_db(move |db| {
            db.put(&key, &value)?;
            db.flush()
        })
        .await
    }

    async fn has(&self, key: &Key) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn delete(&self, key: &Key) -> Result<()> {
        let key = key.as_str().as_bytes().to_vec();
        self.with_db(move |db| {
            db.delete(&key)?;
            db.flush()
        })
        .await
    }

    async fn sync(&self) -> Result<()> {
        Ok(())
    }
}
