//! Advisory lock on a repository's `repo.lock`
//!
//! On unix this is a POSIX record lock (`fcntl(F_SETLK)`), the same kind the
//! node daemon takes. Record locks belong to the whole process and closing
//! any descriptor of the file drops them, so locks taken here are also kept
//! in a process-wide registry and never probed through a second descriptor.

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::{Result, StoreError};

/// Lock file held by whichever process has the repository open
pub const LOCK_FILE: &str = "repo.lock";

static HELD: Mutex<BTreeSet<PathBuf>> = Mutex::new(BTreeSet::new());

fn lock_path(repo_path: &Path) -> PathBuf {
    std::fs::canonicalize(repo_path)
        .unwrap_or_else(|_| repo_path.to_path_buf())
        .join(LOCK_FILE)
}

/// Exclusive hold on `repo.lock`, released on drop
#[derive(Debug)]
pub(crate) struct RepoLock {
    file: File,
    path: PathBuf,
}

impl RepoLock {
    /// Take the lock, creating the lock file if needed
    pub(crate) fn acquire(repo_path: &Path) -> Result<Self> {
        let path = lock_path(repo_path);
        let mut held = HELD.lock().unwrap_or_else(PoisonError::into_inner);
        if held.contains(&path) {
            return Err(StoreError::locked(repo_path.display()));
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| StoreError::io(e).with_context(format!("opening {}", path.display())))?;
        if !try_lock(&file)? {
            return Err(StoreError::locked(repo_path.display()));
        }

        held.insert(path.clone());
        Ok(Self { file, path })
    }

    /// Release the lock explicitly
    pub(crate) fn release(self) -> Result<()> {
        unlock(&self.file)
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        HELD.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.path);
    }
}

/// Whether `repo.lock` is held, by another process or by this one
///
/// A repository without a lock file is not locked.
pub(crate) fn is_held(repo_path: &Path) -> Result<bool> {
    let path = lock_path(repo_path);
    let held = HELD.lock().unwrap_or_else(PoisonError::into_inner);
    if held.contains(&path) {
        return Ok(true);
    }

    let file = match OpenOptions::new().read(true).write(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(StoreError::io(e).with_context(format!("opening {}", path.display())));
        }
    };
    if try_lock(&file)? {
        unlock(&file)?;
        Ok(false)
    } else {
        Ok(true)
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<bool> {
    use rustix::fs::{FlockOperation, fcntl_lock};
    use rustix::io::Errno;

    match fcntl_lock(file, FlockOperation::NonBlockingLockExclusive) {
        Ok(()) => Ok(true),
        Err(e) if e == Errno::AGAIN || e == Errno::ACCESS => Ok(false),
        Err(e) => Err(StoreError::io(std::io::Error::from(e))),
    }
}

#[cfg(unix)]
fn unlock(file: &File) -> Result<()> {
    use rustix::fs::{FlockOperation, fcntl_lock};

    fcntl_lock(file, FlockOperation::Unlock).map_err(|e| StoreError::io(std::io::Error::from(e)))
}

#[cfg(not(unix))]
fn try_lock(file: &File) -> Result<bool> {
    use std::fs::TryLockError;

    match file.try_lock() {
        Ok(()) => Ok(true),
        Err(TryLockError::WouldBlock) => Ok(false),
        Err(TryLockError::Error(e)) => Err(StoreError::io(e)),
    }
}

#[cfg(not(unix))]
fn unlock(file: &File) -> Result<()> {
    Ok(file.unlock()?)
}
