//! Datastore spec: the `datastore_spec` file describing a repository's backends

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::datastore::{
    Backend, FlatfsDatastore, LeveldbDatastore, MemoryDatastore, MountDatastore, RepoDatastore,
    ShardFn,
};
use crate::error::{Result, StoreError};
use crate::key::Key;

/// File name of the datastore spec inside a repository
pub const SPEC_FILE: &str = "datastore_spec";

/// Datastore description, tagged by `type`
///
/// Mirrors the JSON layout written by the node software, for example:
///
/// ```json
/// {"type":"mount","mounts":[
///   {"mountpoint":"/blocks","type":"flatfs","path":"blocks","shardFunc":"/repo/flatfs/shard/v1/next-to-last/2"},
///   {"mountpoint":"/","type":"levelds","path":"datastore","compression":"none"}
/// ]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatastoreSpec {
    /// Prefix routing over child datastores
    Mount {
        /// Children with their mountpoints
        mounts: Vec<MountSpec>,
    },
    /// Metrics wrapper; transparent here
    Measure {
        /// Metrics prefix, unused
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prefix: Option<String>,
        /// Wrapped datastore
        child: Box<DatastoreSpec>,
    },
    /// One file per key
    Flatfs {
        /// Directory, relative to the repo root unless absolute
        path: String,
        /// Shard function identifier
        #[serde(rename = "shardFunc", default, skip_serializing_if = "Option::is_none")]
        shard_func: Option<String>,
        /// Fsync each value before it is renamed into place
        #[serde(default)]
        sync: bool,
    },
    /// In-memory, nothing persisted
    Mem,
    /// LevelDB directory
    Levelds {
        /// Directory, relative to the repo root unless absolute
        path: String,
        /// Block compression requested by the node; reads handle any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        compression: Option<String>,
    },
    /// Any other type
    #[serde(other)]
    Other,
}

/// A mount entry of a [`DatastoreSpec::Mount`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountSpec {
    /// Key prefix routed to this child
    pub mountpoint: String,
    /// The child datastore
    #[serde(flatten)]
    pub spec: DatastoreSpec,
}

/// The layout a freshly initialised node writes: flatfs blocks, LevelDB for the rest
impl Default for DatastoreSpec {
    fn default() -> Self {
        DatastoreSpec::Mount {
            mounts: vec![
                MountSpec {
                    mountpoint: "/blocks".to_string(),
                    spec: DatastoreSpec::Flatfs {
                        path: "blocks".to_string(),
                        shard_func: Some(ShardFn::default().to_string()),
                        sync: true,
                    },
                },
                MountSpec {
                    mountpoint: "/".to_string(),
                    spec: DatastoreSpec::Levelds {
                        path: "datastore".to_string(),
                        compression: Some("none".to_string()),
                    },
                },
            ],
        }
    }
}

impl DatastoreSpec {
    /// Parse a spec from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            StoreError::serialization(e)
                .with_context(format!("parsing {}", SPEC_FILE))
                .with_help("The datastore spec must be a JSON object with a \"type\" field")
        })
    }

    /// Render the spec as JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(StoreError::serialization)
    }

    /// Load the spec of the repository at `repo_root`
    ///
    /// A repository without a spec file gets [`DatastoreSpec::default`].
    pub async fn load(repo_root: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(repo_root.join(SPEC_FILE)).await {
            Ok(text) => Self::from_json(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(StoreError::io(e).with_context(format!("reading {}", SPEC_FILE))),
        }
    }

    /// Open the datastore this spec describes
    pub async fn open(&self, repo_root: &Path) -> Result<RepoDatastore> {
        match self {
            DatastoreSpec::Mount { mounts } => {
                let mut children = Vec::with_capacity(mounts.len());
                for mount in mounts {
                    let backend = mount.spec.open_backend(repo_root).await?;
                    children.push((Key::new(&mount.mountpoint), backend));
                }
                Ok(RepoDatastore::Mount(MountDatastore::new(children)))
            }
            DatastoreSpec::Measure { child, .. } => Box::pin(child.open(repo_root)).await,
            other => Ok(RepoDatastore::Single(other.open_backend(repo_root).await?)),
        }
    }

    async fn open_backend(&self, repo_root: &Path) -> Result<Backend> {
        match self {
            DatastoreSpec::Measure { child, .. } => Box::pin(child.open_backend(repo_root)).await,
            DatastoreSpec::Flatfs {
                path,
                shard_func,
                sync,
            } => {
                let shard = match shard_func {
                    Some(id) => id.parse()?,
                    None => ShardFn::default(),
                };
                let ds = FlatfsDatastore::open(repo_root.join(path), shard, *sync).await?;
                Ok(Backend::Flatfs(ds))
            }
            DatastoreSpec::Mem => Ok(Backend::Memory(MemoryDatastore::new())),
            DatastoreSpec::Mount { .. } => Err(StoreError::invalid_spec(
                "nested mount datastores are not supported",
            )),
            DatastoreSpec::Levelds { path, .. } => {
                let ds = LeveldbDatastore::open(repo_root.join(path)).await?;
                Ok(Backend::Leveldb(ds))
            }
            DatastoreSpec::Other => Err(StoreError::unsupported("unrecognized")),
        }
    }
}
