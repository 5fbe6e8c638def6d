//! `LabelStore` — the label→bytes mapping backed by a single file.
//!
//! A store is loaded in full when opened, mutated purely in memory, and
//! written back in full by [`LabelStore::close`] (or [`LabelStore::save`]).
//! The backing file only reflects the mapping after a successful save.
//!
//! Plain [`LabelStore::open`] takes no inter-process lock: two processes
//! that both open, mutate and close the same file race, and the last close
//! wins. [`LabelStore::open_locked`] holds an exclusive advisory lock for
//! the whole lifetime of the handle instead.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::CoreError;
use crate::lock::StoreLock;

pub struct LabelStore {
    path: PathBuf,
    labels: HashMap<String, Vec<u8>>,
    dirty: bool,
    // Declared last so the lock is released after everything else drops.
    lock: Option<StoreLock>,
}

impl LabelStore {
    // ========================================================================
    // Opening
    // ========================================================================

    /// Open the store at `path`, creating it with the empty serialization
    /// first if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        Self::load(path.as_ref(), None)
    }

    /// Like [`LabelStore::open`], but first blocks until an exclusive
    /// advisory lock on `<path>.lock` is held. The lock is kept until the
    /// store is closed or dropped, so concurrent locked users serialize
    /// their whole read-modify-write cycle.
    ///
    /// The `<path>.lock` file is created on first use and left in place
    /// afterwards; it stays empty and holding it open is what locks.
    pub fn open_locked(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let lock = StoreLock::acquire(path)?;
        Self::load(path, Some(lock))
    }

    fn load(path: &Path, lock: Option<StoreLock>) -> Result<Self, CoreError> {
        if !path.exists() {
            fs::write(path, codec::EMPTY).map_err(|e| CoreError::io(path, e))?;
            tracing::info!(path = %path.display(), "created empty label store");
        }

        let content = fs::read(path).map_err(|e| CoreError::io(path, e))?;
        let labels = codec::decode(&content).map_err(|source| CoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            path = %path.display(),
            labels = labels.len(),
            locked = lock.is_some(),
            "opened label store"
        );

        Ok(Self {
            path: path.to_path_buf(),
            labels,
            dirty: false,
            lock,
        })
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// The value stored under `label`, or an empty slice when the label is
    /// absent. Use [`LabelStore::lookup`] to tell the two apart.
    pub fn get(&self, label: &str) -> &[u8] {
        self.lookup(label).unwrap_or_default()
    }

    pub fn lookup(&self, label: &str) -> Option<&[u8]> {
        self.labels.get(label).map(Vec::as_slice)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    /// Every stored label, in no particular order.
    pub fn labels(&self) -> Vec<&str> {
        self.labels.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ========================================================================
    // Mutation (in memory until saved)
    // ========================================================================

    pub fn set(&mut self, label: impl Into<String>, value: impl Into<Vec<u8>>) {
        let label = label.into();
        let value = value.into();
        if self.labels.get(&label) == Some(&value) {
            return;
        }
        tracing::debug!(label = %label, bytes = value.len(), "set label");
        self.labels.insert(label, value);
        self.dirty = true;
    }

    /// Remove `label`. Removing an absent label is a no-op.
    pub fn delete(&mut self, label: &str) {
        if self.labels.remove(label).is_some() {
            tracing::debug!(label = %label, "deleted label");
            self.dirty = true;
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the current mapping to the backing file.
    ///
    /// The content goes to a temporary file in the same directory that is
    /// then renamed over the store, so the old content stays intact if
    /// writing fails part-way. An existing store keeps its permissions, and
    /// a symlinked store is written through to the file it points at.
    pub fn save(&mut self) -> Result<(), CoreError> {
        let content = codec::encode(&self.labels);
        let target = match fs::canonicalize(&self.path) {
            Ok(real) => real,
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.path.clone(),
            Err(e) => return Err(CoreError::io(&self.path, e)),
        };
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| CoreError::io(dir, e))?;
        tmp.write_all(&content)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| CoreError::io(tmp.path(), e))?;

        match fs::metadata(&target) {
            Ok(meta) => tmp
                .as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| CoreError::io(tmp.path(), e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(CoreError::io(&target, e)),
        }

        tmp.persist(&target)
            .map_err(|e| CoreError::io(&target, e.error))?;

        tracing::debug!(
            path = %target.display(),
            labels = self.labels.len(),
            bytes = content.len(),
            "saved label store"
        );
        self.dirty = false;
        Ok(())
    }

    /// Save and release the store. Consuming `self` makes a second close
    /// (or any use after close) a compile-time error.
    pub fn close(mut self) -> Result<(), CoreError> {
        self.save()
    }
}

impl Drop for LabelStore {
    fn drop(&mut self) {
        if self.dirty {
            tracing::warn!(
                path = %self.path.display(),
                "label store dropped with unsaved changes; they are discarded"
            );
        }
    }
}

impl std::fmt::Debug for LabelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelStore")
            .field("path", &self.path)
            .field("labels", &self.labels.len())
            .field("dirty", &self.dirty)
            .field("lock", &self.lock.as_ref().map(StoreLock::lock_path))
            .finish()
    }
}
