//! Advisory lock serializing whole open→close cycles across processes.
//!
//! The lock lives on a sidecar file (`<store>.lock`) rather than on the
//! store itself, because saving replaces the store file by rename and a
//! lock on the old inode would silently stop protecting anything.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

const LOCK_SUFFIX: &str = ".lock";

pub(crate) struct StoreLock {
    _file: File,
    lock_path: PathBuf,
}

impl StoreLock {
    /// Block until an exclusive lock for `store_path` is held.
    pub(crate) fn acquire(store_path: &Path) -> Result<Self, CoreError> {
        let lock_path = lock_path_for(store_path);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CoreError::io(&lock_path, e))?;

        lock_exclusive(&file).map_err(|e| CoreError::io(&lock_path, e))?;
        tracing::debug!(path = %lock_path.display(), "acquired store lock");

        Ok(Self {
            _file: file,
            lock_path,
        })
    }

    pub(crate) fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        tracing::debug!(path = %self.lock_path.display(), "released store lock");
    }
}

fn lock_path_for(store_path: &Path) -> PathBuf {
    let mut name = OsString::from(store_path.as_os_str());
    name.push(LOCK_SUFFIX);
    PathBuf::from(name)
}

#[cfg(unix)]
fn lock_exclusive(file: &File) -> io::Result<()> {
    use rustix::fs::{flock, FlockOperation};
    use std::os::unix::io::AsFd;

    flock(file.as_fd(), FlockOperation::LockExclusive)
        .map_err(|e| io::Error::from_raw_os_error(e.raw_os_error()))
}

#[cfg(not(unix))]
fn lock_exclusive(_file: &File) -> io::Result<()> {
    tracing::warn!("advisory store locking is not supported on this platform");
    Ok(())
}
