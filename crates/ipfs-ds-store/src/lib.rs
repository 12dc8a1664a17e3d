//! Local repository access for ipfs-ds
//!
//! This crate opens the on-disk repository of a content-addressed node and
//! exposes its key-value datastore:
//!
//! - **Keys**: cleaned slash-separated paths ([`Key`])
//! - **Datastores**: an async [`Datastore`] trait with memory, flat-file,
//!   LevelDB and mount implementations
//! - **Datastore spec**: the repository's `datastore_spec` file, selecting
//!   which backends serve which key prefixes
//! - **Repository**: path resolution (`--repo`, `$IPFS_PATH`, `~/.ipfs`),
//!   the `repo.lock` exclusive lock, open and close
//!
//! # Example
//!
//! ```rust,ignore
//! use ipfs_ds_store::{Datastore, Key, Repository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Repository::open_resolved(None).await?;
//! let key = Key::new("/local/filesroot");
//!
//! if let Some(value) = repo.datastore().get(&key).await? {
//!     println!("{} bytes", value.len());
//! }
//! repo.close().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

/// Datastore trait and backends
pub mod datastore;
pub mod error;
pub mod key;
mod lock;
pub mod repo;
pub mod spec;

pub use datastore::{
    Backend, Datastore, FlatfsDatastore, LeveldbDatastore, MemoryDatastore, MountDatastore,
    RepoDatastore, ShardFn,
};
pub use error::{Result, StoreError, StoreErrorKind};
pub use key::Key;
pub use repo::{Repository, is_locked_by_other_process, resolve_repo_path};
pub use spec::{DatastoreSpec, MountSpec};
