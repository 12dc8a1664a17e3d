//! Flat-file datastore: one file per key, sharded into sub-directories

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use crate::datastore::Datastore;
use crate::error::{Result, StoreError};
use crate::key::Key;

/// Name of the file recording the shard function of a flatfs directory
pub const SHARDING_FILE: &str = "SHARDING";

/// Extension of value files
pub const DATA_EXTENSION: &str = "data";

const SHARD_FN_PREFIX: &str = "/repo/flatfs/shard/v1/";

/// Shard function deciding which sub-directory holds a given file name
///
/// Short names are padded with `_` so every name maps to a directory of
/// exactly `n` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardFn {
    /// First `n` characters of the name
    Prefix(usize),
    /// Last `n` characters of the name
    Suffix(usize),
    /// `n` characters ending one before the last character
    NextToLast(usize),
}

impl ShardFn {
    /// Directory name for a value file name (without extension)
    ///
    /// `name` is expected to be a valid flatfs name, so ASCII only.
    pub fn dir_for(&self, name: &str) -> String {
        match *self {
            ShardFn::Prefix(n) => {
                let padded = format!("{}{}", name, "_".repeat(n));
                padded[..n].to_string()
            }
            ShardFn::Suffix(n) => {
                let padded = format!("{}{}", "_".repeat(n), name);
                padded[padded.len() - n..].to_string()
            }
            ShardFn::NextToLast(n) => {
                let padded = format!("{}{}", "_".repeat(n + 1), name);
                let offset = padded.len() - n - 1;
                padded[offset..offset + n].to_string()
            }
        }
    }
}

impl Default for ShardFn {
    fn default() -> Self {
        ShardFn::NextToLast(2)
    }
}

impl fmt::Display for ShardFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, n) = match self {
            ShardFn::Prefix(n) => ("prefix", n),
            ShardFn::Suffix(n) => ("suffix", n),
            ShardFn::NextToLast(n) => ("next-to-last", n),
        };
        write!(f, "{}{}/{}", SHARD_FN_PREFIX, name, n)
    }
}

impl FromStr for ShardFn {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s.trim().strip_prefix(SHARD_FN_PREFIX).ok_or_else(|| {
            StoreError::invalid_spec(format!("invalid shard function: {}", s))
                .with_help("Shard functions look like /repo/flatfs/shard/v1/next-to-last/2")
        })?;
        let (name, n) = rest
            .split_once('/')
            .ok_or_else(|| StoreError::invalid_spec(format!("invalid shard function: {}", s)))?;
        let n: usize = n
            .parse()
            .map_err(|_| StoreError::invalid_spec(format!("invalid shard length in: {}", s)))?;
        if n == 0 {
            return Err(StoreError::invalid_spec(format!(
                "shard length must be positive: {}",
                s
            )));
        }
        match name {
            "prefix" => Ok(ShardFn::Prefix(n)),
            "suffix" => Ok(ShardFn::Suffix(n)),
            "next-to-last" => Ok(ShardFn::NextToLast(n)),
            other => Err(StoreError::invalid_spec(format!(
                "unknown shard function: {}",
                other
            ))),
        }
    }
}

/// Flat-file datastore
///
/// Each key is stored in its own file named after the key without its
/// leading slash, so `/CIQA...` lives at `<shard>/CIQA....data`. Only
/// single-segment keys made of `0-9`, `A-Z`, `+`, `-`, `_` and `=` can be
/// stored; any other key is never present. Files live in a shard directory
/// picked by [`ShardFn`].
///
/// Writes go to a temporary file first and are renamed into place, so a
/// reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FlatfsDatastore {
    path: PathBuf,
    shard: ShardFn,
    sync: bool,
}

impl FlatfsDatastore {
    /// Open (creating if needed) a flatfs directory
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created, or if an existing
    /// `SHARDING` file names a different shard function.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display())))]
    pub async fn open(path: impl AsRef<Path>, shard: ShardFn, sync: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&path).await?;

        let sharding = path.join(SHARDING_FILE);
        match tokio::fs::read_to_string(&sharding).await {
            Ok(existing) => {
                let existing: ShardFn = existing.parse()?;
                if existing != shard {
                    return Err(StoreError::invalid_spec(format!(
                        "shard function mismatch: directory uses {}, spec requests {}",
                        existing, shard
                    ))
                    .with_context(format!("flatfs: {}", path.display())));
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::write(&sharding, format!("{}\n", shard)).await?;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self { path, shard, sync })
    }

    /// Root directory of this datastore
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shard function in use
    pub fn shard(&self) -> ShardFn {
        self.shard
    }

    /// On-disk file name (without extension) for a key
    ///
    /// # Errors
    ///
    /// `InvalidKey` unless the key is a single segment of flatfs-safe
    /// characters.
    pub fn file_name(key: &Key) -> Result<&str> {
        let name = key.as_str().trim_start_matches('/');
        if is_valid_name(name) {
            Ok(name)
        } else {
            Err(StoreError::invalid_key(
                key.as_str(),
                "flatfs keys must be one segment of 0-9, A-Z, '+', '-', '_' or '='",
            ))
        }
    }

    /// Path of the value file for a key
    pub fn file_path(&self, key: &Key) -> Result<PathBuf> {
        let name = Self::file_name(key)?;
        Ok(self
            .path
            .join(self.shard.dir_for(name))
            .join(format!("{}.{}", name, DATA_EXTENSION)))
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'A'..=b'Z' | b'+' | b'-' | b'_' | b'='))
}

impl Datastore for FlatfsDatastore {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self), fields(key = %key)))]
    async fn get(&self, key: &Key) -> Result<Option<Bytes>> {
        let Ok(file) = self.file_path(key) else {
            return Ok(None);
        };
        match tokio::fs::read(file).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(e).with_context(format!("reading key {}", key))),
        }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, value), fields(key = %key, len = value.len())))]
    async fn put(&self, key: &Key, value: &[u8]) -> Result<()> {
        let name = Self::file_name(key)?;
        let file = self.file_path(key)?;
        // file_path always joins a shard directory
        let Some(dir) = file.parent() else {
            return Err(StoreError::invalid_key(key.as_str(), "no shard directory"));
        };
        tokio::fs::create_dir_all(dir).await?;

        let temp = dir.join(format!("put-{}", name));
        let mut out = tokio::fs::File::create(&temp).await?;
        out.write_all(value).await?;
        if self.sync {
            out.sync_all().await?;
        }
        drop(out);

        tokio::fs::rename(&temp, &file)
            .await
            .map_err(|e| StoreError::io(e).with_context(format!("writing key {}", key)))
    }

    async fn has(&self, key: &Key) -> Result<bool> {
        match self.file_path(key) {
            Ok(file) => Ok(tokio::fs::try_exists(file).await?),
            Err(_) => Ok(false),
        }
    }

    async fn delete(&self, key: &Key) -> Result<()> {
        let Ok(file) = self.file_path(key) else {
            return Ok(());
        };
        match tokio::fs::remove_file(file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn sync(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_shard_fn_parse_and_display() {
        let f: ShardFn = "/repo/flatfs/shard/v1/next-to-last/2".parse().unwrap();
        assert_eq!(f, ShardFn::NextToLast(2));
        assert_eq!(f.to_string(), "/repo/flatfs/shard/v1/next-to-last/2");

        let f: ShardFn = "/repo/flatfs/shard/v1/prefix/4\n".parse().unwrap();
        assert_eq!(f, ShardFn::Prefix(4));

        assert!("/repo/flatfs/shard/v1/middle/2".parse::<ShardFn>().is_err());
        assert!("/repo/flatfs/shard/v1/suffix/0".parse::<ShardFn>().is_err());
        assert!("next-to-last/2".parse::<ShardFn>().is_err());
    }

    #[test]
    fn test_shard_dirs() {
        assert_eq!(ShardFn::NextToLast(2).dir_for("ABCDEF"), "DE");
        assert_eq!(ShardFn::NextToLast(2).dir_for("A"), "__");
        assert_eq!(ShardFn::NextToLast(2).dir_for("AB"), "_A");
        assert_eq!(ShardFn::NextToLast(2).dir_for(""), "__");
        assert_eq!(
            ShardFn::NextToLast(2).dir_for("CIQBED3K6YA5I3QQWLJOCHWXDRK5EXZQILBCKAPEDUJENZ5B5HJ5R3A"),
            "R3"
        );
        assert_eq!(ShardFn::Prefix(3).dir_for("ABCDEF"), "ABC");
        assert_eq!(ShardFn::Prefix(3).dir_for("A"), "A__");
        assert_eq!(ShardFn::Suffix(2).dir_for("ABCDEF"), "EF");
        assert_eq!(ShardFn::Suffix(2).dir_for("A"), "_A");
    }

    #[tokio::test]
    async fn test_put_get_has_delete() {
        let dir = TempDir::new().unwrap();
        let ds = FlatfsDatastore::open(dir.path(), ShardFn::default(), false)
            .await
            .unwrap();
        let key = Key::new("/MYKEY");

        assert_eq!(ds.get(&key).await.unwrap(), None);
        ds.put(&key, b"myvalue").await.unwrap();
        assert!(ds.has(&key).await.unwrap());
        assert_eq!(ds.get(&key).await.unwrap().as_deref(), Some(&b"myvalue"[..]));
        assert!(dir.path().join("KE").join("MYKEY.data").exists());

        ds.delete(&key).await.unwrap();
        ds.delete(&key).await.unwrap();
        assert!(!ds.has(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_reopen_persists_values() {
        let dir = TempDir::new().unwrap();
        let key = Key::new("/CIQBED3K6YA5I3QQWLJOCHWXDRK5EXZQILBCKAPEDUJENZ5B5HJ5R3A");
        {
            let ds = FlatfsDatastore::open(dir.path(), ShardFn::default(), true)
                .await
                .unwrap();
            ds.put(&key, &[0u8, 159, 146, 150]).await.unwrap();
        }

        let ds = FlatfsDatastore::open(dir.path(), ShardFn::default(), true)
            .await
            .unwrap();
        assert_eq!(
            ds.get(&key).await.unwrap().as_deref(),
            Some(&[0u8, 159, 146, 150][..])
        );
        let sharding = std::fs::read_to_string(dir.path().join(SHARDING_FILE)).unwrap();
        assert_eq!(sharding.trim(), ShardFn::default().to_string());
    }

    #[tokio::test]
    async fn test_sharding_mismatch() {
        let dir = TempDir::new().unwrap();
        FlatfsDatastore::open(dir.path(), ShardFn::Prefix(2), false)
            .await
            .unwrap();

        let err = FlatfsDatastore::open(dir.path(), ShardFn::Suffix(2), false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &StoreErrorKind::InvalidSpec);
    }

    #[tokio::test]
    async fn test_invalid_keys() {
        let dir = TempDir::new().unwrap();
        let ds = FlatfsDatastore::open(dir.path(), ShardFn::default(), false)
            .await
            .unwrap();

        for key in ["/mykey", "/local/filesroot", "/", "/A.B"] {
            let key = Key::new(key);
            let err = ds.put(&key, b"v").await.unwrap_err();
            assert_eq!(err.kind(), &StoreErrorKind::InvalidKey, "key {}", key);
            assert_eq!(ds.get(&key).await.unwrap(), None);
            assert!(!ds.has(&key).await.unwrap());
            ds.delete(&key).await.unwrap();
        }

        let ok = Key::new("/AFZBEIG+-_=09");
        assert_eq!(FlatfsDatastore::file_name(&ok).unwrap(), "AFZBEIG+-_=09");
        ds.put(&ok, b"v").await.unwrap();
    }

    #[tokio::test]
    async fn test_reads_files_written_by_the_node() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SHARDING_FILE),
            "/repo/flatfs/shard/v1/next-to-last/2",
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("R3")).unwrap();
        std::fs::write(
            dir.path()
                .join("R3")
                .join("CIQBED3K6YA5I3QQWLJOCHWXDRK5EXZQILBCKAPEDUJENZ5B5HJ5R3A.data"),
            b"node block",
        )
        .unwrap();

        let ds = FlatfsDatastore::open(dir.path(), ShardFn::default(), true)
            .await
            .unwrap();
        let key = Key::new("/CIQBED3K6YA5I3QQWLJOCHWXDRK5EXZQILBCKAPEDUJENZ5B5HJ5R3A");
        assert_eq!(
            ds.get(&key).await.unwrap().as_deref(),
            Some(&b"node block"[..])
        );
    }
}
