//! The vault lifecycle state machine.
//!
//! `VaultEngine` owns the decrypted entry collection while unlocked
//! and is the only component allowed to mutate it. Every mutation
//! re-encrypts the entire collection with a fresh nonce and pushes the
//! new blob to the storage collaborator — there is no dirty buffering
//! and no partial write, so what is displayed and what is at rest can
//! only differ when a save has failed (which is logged, surfaced via
//! `last_persist_error`, and superseded by the next mutation's save).
//!
//! Methods take `&mut self`, so the single-writer discipline of the
//! design is enforced by the borrow checker rather than by locks.
//! Key derivation is CPU-bound; embedders driving an event loop run
//! engine calls on a worker thread.

use tracing::{debug, warn};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::crypto::kdf::{derive_key_with_params, generate_salt, KdfParams, SALT_LEN};
use crate::crypto::keys::VaultKey;
use crate::errors::{Result, VaultError};
use crate::storage::{StoreError, VaultStore};

use super::blob::EncryptedBlob;
use super::codec;
use super::entry::{now_millis, EntryDraft, VaultEntry};
use super::search;

/// Minimum master password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 12;

/// Public view of the engine lifecycle, for UI binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// Transient: the persisted record has not been fetched yet.
    Loading,
    /// No vault exists — waiting for a master password.
    Setup,
    /// A blob exists but no key has been derived.
    Locked,
    /// Key held, entries decrypted in memory.
    Unlocked,
}

/// Internal lifecycle state. `Locked` keeps no payload — the last
/// known blob lives on the engine so it survives lock/unlock cycles.
enum EngineState {
    Loading,
    Setup,
    Locked,
    Unlocked {
        key: VaultKey,
        salt: [u8; SALT_LEN],
        entries: Vec<VaultEntry>,
    },
}

impl EngineState {
    fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Setup => "setup",
            Self::Locked => "locked",
            Self::Unlocked { .. } => "unlocked",
        }
    }
}

/// The vault engine: key derivation + codec + lifecycle in one
/// explicit instance.
///
/// Never a process-wide singleton — each engine owns its session
/// state, so multiple vaults (or tests) coexist freely.
pub struct VaultEngine<S: VaultStore> {
    store: S,
    state: EngineState,

    /// Most recently persisted (or sealed) record. Invariant: `Locked`
    /// implies this is `Some`.
    blob: Option<EncryptedBlob>,

    /// Last failed save, kept for UI diagnostics until a save
    /// succeeds. Failures never roll back in-memory state.
    last_persist_error: Option<String>,

    kdf: KdfParams,
}

impl<S: VaultStore> VaultEngine<S> {
    /// Create an engine over a storage backend. The engine starts in
    /// `Loading`; call [`init`](Self::init) to fetch the persisted
    /// record.
    pub fn new(store: S) -> Self {
        Self::with_kdf_params(store, KdfParams::default())
    }

    /// Create an engine with an explicit KDF configuration.
    pub fn with_kdf_params(store: S, kdf: KdfParams) -> Self {
        Self {
            store,
            state: EngineState::Loading,
            blob: None,
            last_persist_error: None,
            kdf,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Fetch the persisted record and leave `Loading`.
    ///
    /// Confirmed absence routes to `Setup`; a present record routes to
    /// `Locked`. A failed read is NOT treated as "no vault" — it
    /// surfaces as `StorageUnavailable` and the engine stays in
    /// `Loading` so the call can be retried, rather than presenting a
    /// create-new-vault flow over a recoverable record. A record that
    /// does not parse surfaces as `MalformedBlob`; only `reset` moves
    /// on from that.
    pub fn init(&mut self) -> Result<VaultState> {
        match &self.state {
            EngineState::Loading => {}
            state => return Err(VaultError::InvalidState(state.name())),
        }

        match self.store.load() {
            Ok(Some(blob)) => {
                debug!(entry_count = blob.entry_count, "vault record found");
                self.blob = Some(blob);
                self.state = EngineState::Locked;
                Ok(VaultState::Locked)
            }
            Ok(None) => {
                debug!("no vault record; entering setup");
                self.state = EngineState::Setup;
                Ok(VaultState::Setup)
            }
            Err(StoreError::Malformed(msg)) => Err(VaultError::MalformedBlob(msg)),
            Err(StoreError::Io(e)) => Err(VaultError::StorageUnavailable(e.to_string())),
        }
    }

    /// Create a new vault from a master password.
    ///
    /// Validates strength and confirmation, generates the one salt
    /// this password will ever have, derives the session key, and
    /// enters `Unlocked` with an empty collection. Nothing is
    /// encrypted or persisted until the first mutation.
    pub fn setup(&mut self, password: &str, confirm: &str) -> Result<()> {
        match &self.state {
            EngineState::Setup => {}
            state => return Err(VaultError::InvalidState(state.name())),
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(VaultError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }
        if password != confirm {
            return Err(VaultError::Mismatch);
        }

        let salt = generate_salt();
        let mut raw = derive_key_with_params(password, &salt, &self.kdf)?;
        let key = VaultKey::new(raw);
        raw.zeroize();

        self.state = EngineState::Unlocked {
            key,
            salt,
            entries: Vec::new(),
        };
        debug!("vault created; now unlocked");
        Ok(())
    }

    /// Derive a key from `password` + the stored salt and try to open
    /// the blob.
    ///
    /// A tag-verification failure surfaces as `WrongPassword` and the
    /// engine stays `Locked` — whether the cause was a bad password or
    /// corrupted ciphertext is deliberately not distinguished. Each
    /// attempt is independent; a failed one leaves nothing behind.
    pub fn unlock(&mut self, password: &str) -> Result<()> {
        match &self.state {
            EngineState::Locked => {}
            state => return Err(VaultError::InvalidState(state.name())),
        }

        let blob = self
            .blob
            .as_ref()
            .ok_or_else(|| VaultError::MalformedBlob("vault record missing".into()))?;

        let salt = codec::salt_from_blob(blob)?;
        let mut raw = derive_key_with_params(password, &salt, &self.kdf)?;

        let entries = match codec::open(&raw, blob) {
            Ok(entries) => entries,
            Err(VaultError::DecryptionFailed) => {
                raw.zeroize();
                return Err(VaultError::WrongPassword);
            }
            Err(e) => {
                raw.zeroize();
                return Err(e);
            }
        };

        let key = VaultKey::new(raw);
        raw.zeroize();

        debug!(entry_count = entries.len(), "vault unlocked");
        self.state = EngineState::Unlocked { key, salt, entries };
        Ok(())
    }

    /// Discard the session key and decrypted entries.
    ///
    /// Normally performs no I/O — the blob already reflects the last
    /// mutation. The one exception is a fresh vault that was never
    /// mutated: it has no blob yet, so the empty collection is sealed
    /// and saved first to keep `Locked` unlockable.
    pub fn lock(&mut self) -> Result<()> {
        match &self.state {
            EngineState::Unlocked { .. } => {}
            state => return Err(VaultError::InvalidState(state.name())),
        }

        if self.blob.is_none() {
            self.persist();
            if self.blob.is_none() {
                // Sealing itself failed — without a blob there would be
                // nothing to unlock, so refuse to lock.
                return Err(VaultError::PersistenceFailed(
                    self.last_persist_error.clone().unwrap_or_default(),
                ));
            }
        }

        self.state = EngineState::Locked;
        debug!("vault locked");
        Ok(())
    }

    /// Destroy the vault: delete the persisted record and return to
    /// `Setup`. Irreversible, and idempotent — calling it again from
    /// `Setup` just re-confirms the state.
    pub fn reset(&mut self) -> Result<()> {
        if let Err(e) = self.store.save(None) {
            // Reset still proceeds: the session is cleared either way,
            // and an orphaned record surfaces as `Locked` on a later
            // init or is overwritten by the next vault's first save.
            warn!(error = %e, "failed to delete persisted vault during reset");
            self.last_persist_error = Some(e.to_string());
        } else {
            self.last_persist_error = None;
        }

        self.blob = None;
        self.state = EngineState::Setup;
        debug!("vault reset");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entry mutations (unlocked only; each one persists)
    // ------------------------------------------------------------------

    /// Validate and add a new entry at the front of the collection
    /// (most recently added first). Returns the new entry's id.
    pub fn add_entry(&mut self, mut draft: EntryDraft) -> Result<Uuid> {
        draft.validate()?;

        let id;
        match &mut self.state {
            EngineState::Unlocked { entries, .. } => {
                let entry = draft.into_entry();
                id = entry.id;
                entries.insert(0, entry);
            }
            state => return Err(VaultError::InvalidState(state.name())),
        }

        self.persist();
        Ok(id)
    }

    /// Replace the editable fields of an existing entry, preserving
    /// its id and position.
    pub fn update_entry(&mut self, id: Uuid, mut draft: EntryDraft) -> Result<()> {
        draft.validate()?;

        match &mut self.state {
            EngineState::Unlocked { entries, .. } => {
                let entry = entries
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or(VaultError::EntryNotFound(id))?;
                draft.apply_to(entry);
            }
            state => return Err(VaultError::InvalidState(state.name())),
        }

        self.persist();
        Ok(())
    }

    /// Remove an entry. A missing id is a no-op that still persists
    /// (the collection is unchanged but the save policy is uniform);
    /// the return value says whether anything was removed.
    pub fn delete_entry(&mut self, id: Uuid) -> Result<bool> {
        let removed;
        match &mut self.state {
            EngineState::Unlocked { entries, .. } => {
                let before = entries.len();
                entries.retain(|e| e.id != id);
                removed = entries.len() != before;
            }
            state => return Err(VaultError::InvalidState(state.name())),
        }

        self.persist();
        Ok(removed)
    }

    /// Flip an entry's favorite flag. Returns the new value.
    pub fn toggle_favorite(&mut self, id: Uuid) -> Result<bool> {
        let favorite;
        match &mut self.state {
            EngineState::Unlocked { entries, .. } => {
                let entry = entries
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or(VaultError::EntryNotFound(id))?;
                entry.favorite = !entry.favorite;
                entry.last_updated = now_millis();
                favorite = entry.favorite;
            }
            state => return Err(VaultError::InvalidState(state.name())),
        }

        self.persist();
        Ok(favorite)
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> VaultState {
        match &self.state {
            EngineState::Loading => VaultState::Loading,
            EngineState::Setup => VaultState::Setup,
            EngineState::Locked => VaultState::Locked,
            EngineState::Unlocked { .. } => VaultState::Unlocked,
        }
    }

    /// The decrypted collection, newest first. Unlocked only.
    pub fn entries(&self) -> Result<&[VaultEntry]> {
        match &self.state {
            EngineState::Unlocked { entries, .. } => Ok(entries),
            state => Err(VaultError::InvalidState(state.name())),
        }
    }

    /// Search + tag filter over the decrypted collection. Unlocked
    /// only; pure read, no persistence implication.
    pub fn find_entries(&self, query: &str, tag: Option<&str>) -> Result<Vec<&VaultEntry>> {
        Ok(search::filter_entries(self.entries()?, query, tag))
    }

    /// Distinct tags across the collection, for the filter UI.
    pub fn tags(&self) -> Result<Vec<String>> {
        Ok(search::all_tags(self.entries()?))
    }

    /// Entry count without decrypting: live count while unlocked,
    /// blob metadata otherwise.
    pub fn entry_count(&self) -> Option<usize> {
        match &self.state {
            EngineState::Unlocked { entries, .. } => Some(entries.len()),
            _ => self.blob.as_ref().map(|b| b.entry_count),
        }
    }

    /// Timestamp of the last successful encryption, from blob
    /// metadata.
    pub fn last_updated(&self) -> Option<i64> {
        self.blob.as_ref().map(|b| b.last_updated)
    }

    /// The last save failure, if the most recent save did not
    /// succeed. Cleared by the next successful save.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Seal the current collection and push it to storage.
    ///
    /// Called after every mutation. A failure is logged and recorded
    /// but never rolls back the in-memory collection — the next
    /// mutation's save carries the now-current state, superseding the
    /// failed one.
    fn persist(&mut self) {
        let EngineState::Unlocked { key, salt, entries } = &self.state else {
            return;
        };

        let blob = match codec::seal(key.as_bytes(), salt, entries) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "sealing vault for persistence failed");
                self.last_persist_error = Some(e.to_string());
                return;
            }
        };

        self.blob = Some(blob.clone());

        match self.store.save(Some(&blob)) {
            Ok(()) => {
                self.last_persist_error = None;
            }
            Err(e) => {
                warn!(error = %e, "vault save failed; in-memory state retained");
                self.last_persist_error = Some(e.to_string());
            }
        }
    }
}
