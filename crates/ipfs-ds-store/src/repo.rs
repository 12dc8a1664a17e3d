//! Repository discovery, locking, and datastore access
//!
//! A repository is a directory owned by the node software. This module only
//! touches three things inside it: the `repo.lock` file, the
//! `datastore_spec` file, and the datastore directories that spec names.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::datastore::{Datastore, RepoDatastore};
use crate::error::{Result, StoreError, StoreErrorKind};
use crate::lock::{self, RepoLock};
use crate::spec::{DatastoreSpec, SPEC_FILE};

pub use crate::lock::LOCK_FILE;

/// Environment variable naming the repository path
pub const ENV_REPO_PATH: &str = "IPFS_PATH";

/// Repository directory used when neither a path nor [`ENV_REPO_PATH`] is given
pub const DEFAULT_REPO_DIR: &str = "~/.ipfs";

/// Resolve the repository path
///
/// Precedence: `explicit`, then `$IPFS_PATH`, then `~/.ipfs`. A leading `~`
/// expands to `$HOME`.
pub fn resolve_repo_path(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_repo_path_with(
        explicit,
        std::env::var_os(ENV_REPO_PATH),
        std::env::var_os("HOME"),
    )
}

fn resolve_repo_path_with(
    explicit: Option<&Path>,
    env_path: Option<OsString>,
    home: Option<OsString>,
) -> Result<PathBuf> {
    let raw = match (explicit, env_path) {
        (Some(path), _) if !path.as_os_str().is_empty() => path.to_path_buf(),
        (_, Some(env)) if !env.is_empty() => PathBuf::from(env),
        _ => PathBuf::from(DEFAULT_REPO_DIR),
    };
    expand_home(&raw, home)
}

fn expand_home(path: &Path, home: Option<OsString>) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = home.filter(|h| !h.is_empty()).ok_or_else(|| {
        StoreError::new(StoreErrorKind::NotFound, None)
            .with_context(format!("cannot expand {}: HOME is not set", path.display()))
            .with_help(format!("Pass --repo or set {}", ENV_REPO_PATH))
    })?;
    Ok(PathBuf::from(home).join(rest))
}

/// Whether the repository lock is taken, usually by a running daemon
///
/// Also true while a [`Repository`] for the same path is open in this
/// process. A repository without a lock file is not locked.
pub fn is_locked_by_other_process(repo_path: &Path) -> Result<bool> {
    lock::is_held(repo_path)
}

/// An open repository
///
/// Holds the repository lock until [`Repository::close`] is called or the
/// value is dropped.
#[derive(Debug)]
pub struct Repository {
    path: PathBuf,
    spec: DatastoreSpec,
    datastore: RepoDatastore,
    lock: RepoLock,
}

impl Repository {
    /// Open the repository at `path`, taking its lock
    ///
    /// # Errors
    ///
    /// - `NotFound` if the directory does not exist
    /// - `Locked` if another process (usually the daemon) holds the lock
    /// - any error from reading the datastore spec or opening the datastore
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display())))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::not_found("repository", path.display())
                .with_help("Initialize the repository first, or point --repo at an existing one"));
        }

        let lock = RepoLock::acquire(&path)?;
        let spec = DatastoreSpec::load(&path).await?;
        let datastore = spec.open(&path).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(spec = ?spec, "opened repository datastore");

        Ok(Self {
            path,
            spec,
            datastore,
            lock,
        })
    }

    /// Resolve the repository path (see [`resolve_repo_path`]) and open it
    pub async fn open_resolved(explicit: Option<&Path>) -> Result<Self> {
        let path = resolve_repo_path(explicit)?;
        Self::open(path).await
    }

    /// Create a repository directory with the given datastore spec, then open it
    ///
    /// An existing spec file is left untouched.
    pub async fn init(path: impl AsRef<Path>, spec: &DatastoreSpec) -> Result<Self> {
        let path = path.as_ref();
        tokio::fs::create_dir_all(path).await?;
        let spec_path = path.join(SPEC_FILE);
        if !tokio::fs::try_exists(&spec_path).await? {
            tokio::fs::write(&spec_path, spec.to_json()?).await?;
        }
        Self::open(path).await
    }

    /// Repository root directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Datastore spec the repository was opened with
    pub fn spec(&self) -> &DatastoreSpec {
        &self.spec
    }

    /// The repository's datastore
    pub fn datastore(&self) -> &RepoDatastore {
        &self.datastore
    }

    /// Flush the datastore and release the lock
    pub async fn close(self) -> Result<()> {
        self.datastore.sync().await?;
        self.lock.release()
    }
}
