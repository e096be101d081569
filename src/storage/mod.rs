//! Storage collaborator boundary.
//!
//! The engine persists exactly one record — the `EncryptedBlob` — and
//! any backend honoring this contract is interchangeable: a flat file,
//! a browser key-value store, or a remote per-account record. The
//! backend never sees plaintext; concurrency control across multiple
//! clients (last-write-wins or otherwise) is its problem, not the
//! engine's.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::vault::blob::EncryptedBlob;

/// Errors a storage backend can report.
///
/// `Io` means the backend could not be reached or read/written —
/// the record may still exist. `Malformed` means bytes were read but
/// do not parse as a vault record.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored vault record is malformed: {0}")]
    Malformed(String),
}

/// The persistence contract consumed by the vault engine.
///
/// `load` returning `Ok(None)` means "no vault exists yet" —
/// confirmed absence, distinct from a read failure. `save(None)`
/// deletes the persisted record.
pub trait VaultStore {
    fn load(&self) -> Result<Option<EncryptedBlob>, StoreError>;
    fn save(&mut self, blob: Option<&EncryptedBlob>) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryInner {
    blob: Option<EncryptedBlob>,
    saves: usize,
    fail_saves: bool,
    fail_loads: bool,
}

/// In-memory backend over a shared handle.
///
/// Clones share the same record, so an embedder (or a test) can keep
/// one handle for inspection while the engine owns another. Save
/// attempts are counted, and failures can be injected to exercise the
/// engine's persistence-failure path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-persisted record.
    pub fn with_blob(blob: EncryptedBlob) -> Self {
        let store = Self::new();
        store.inner().blob = Some(blob);
        store
    }

    /// The currently persisted record, if any.
    pub fn blob(&self) -> Option<EncryptedBlob> {
        self.inner().blob.clone()
    }

    /// Number of `save` attempts so far (successful or not).
    pub fn saves(&self) -> usize {
        self.inner().saves
    }

    /// Make subsequent `save` calls fail with an I/O error.
    pub fn fail_saves(&self, fail: bool) {
        self.inner().fail_saves = fail;
    }

    /// Make subsequent `load` calls fail with an I/O error.
    pub fn fail_loads(&self, fail: bool) {
        self.inner().fail_loads = fail;
    }

    // A poisoned lock only means a panic elsewhere; the record itself
    // is still usable.
    fn inner(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VaultStore for MemoryStore {
    fn load(&self) -> Result<Option<EncryptedBlob>, StoreError> {
        let inner = self.inner();
        if inner.fail_loads {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::Other,
                "injected load failure",
            )));
        }
        Ok(inner.blob.clone())
    }

    fn save(&mut self, blob: Option<&EncryptedBlob>) -> Result<(), StoreError> {
        let mut inner = self.inner();
        inner.saves += 1;
        if inner.fail_saves {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::Other,
                "injected save failure",
            )));
        }
        inner.blob = blob.cloned();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// Flat-file backend: one JSON document per vault.
///
/// Writes go to a temp file in the same directory and are renamed
/// over the target, so readers never see a half-written record.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VaultStore for FileStore {
    fn load(&self) -> Result<Option<EncryptedBlob>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = fs::read(&self.path)?;
        let blob = serde_json::from_slice(&data)
            .map_err(|e| StoreError::Malformed(format!("vault record JSON: {e}")))?;
        Ok(Some(blob))
    }

    fn save(&mut self, blob: Option<&EncryptedBlob>) -> Result<(), StoreError> {
        let Some(blob) = blob else {
            // Delete. A record that is already gone is fine.
            match fs::remove_file(&self.path) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        };

        let data = serde_json::to_vec(blob)
            .map_err(|e| StoreError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        // Atomic write: temp file in the same directory, then rename.
        let parent = self.path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy()
        ));

        fs::write(&tmp_path, &data)?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blob() -> EncryptedBlob {
        EncryptedBlob {
            cipher: vec![1, 2, 3],
            iv: vec![0; 12],
            salt: vec![7; 16],
            last_updated: 42,
            entry_count: 1,
        }
    }

    #[test]
    fn memory_store_roundtrip_and_counting() {
        let store = MemoryStore::new();
        let mut writer = store.clone();

        assert!(store.load().expect("load").is_none());

        writer.save(Some(&sample_blob())).expect("save");
        assert_eq!(store.saves(), 1);
        assert_eq!(store.blob().expect("blob").entry_count, 1);

        writer.save(None).expect("delete");
        assert_eq!(store.saves(), 2);
        assert!(store.blob().is_none());
    }

    #[test]
    fn memory_store_injected_failure_counts_attempt() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        store.fail_saves(true);

        assert!(writer.save(Some(&sample_blob())).is_err());
        assert_eq!(store.saves(), 1);
        assert!(store.blob().is_none());
    }

    #[test]
    fn file_store_absent_file_is_none() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path().join("vault.json"));
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let mut store = FileStore::new(dir.path().join("vault.json"));

        store.save(Some(&sample_blob())).expect("save");
        let loaded = store.load().expect("load").expect("blob present");
        assert_eq!(loaded, sample_blob());
    }

    #[test]
    fn file_store_delete_removes_file_and_is_idempotent() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let mut store = FileStore::new(dir.path().join("vault.json"));

        store.save(Some(&sample_blob())).expect("save");
        store.save(None).expect("delete");
        assert!(!store.path().exists());

        // Deleting again is a no-op.
        store.save(None).expect("delete twice");
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn file_store_garbage_is_malformed() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("vault.json");
        fs::write(&path, b"{not json").expect("write garbage");

        let store = FileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Malformed(_))));
    }
}
