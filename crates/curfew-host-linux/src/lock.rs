//! Single-instance lock
//!
//! Two checks running at once would both record a tick for the same minute.

use curfew_host_api::{HostError, HostResult};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive advisory lock held for the life of the value
#[derive(Debug)]
pub struct InstanceLock {
    _lock: Flock<File>,
    path: PathBuf,
}

impl InstanceLock {
    /// Take the lock at `path` without blocking.
    ///
    /// Returns `Ok(None)` when another process holds it.
    pub fn try_acquire(path: impl AsRef<Path>) -> HostResult<Option<Self>> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(lock) => {
                debug!(path = %path.display(), "Instance lock acquired");
                Ok(Some(Self {
                    _lock: lock,
                    path: path.to_path_buf(),
                }))
            }
            Err((_, Errno::EWOULDBLOCK)) => {
                debug!(path = %path.display(), "Instance lock held elsewhere");
                Ok(None)
            }
            Err((_, errno)) => Err(HostError::Io(errno.into())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
