//! Session key wrapper.
//!
//! The derived vault key is the only key material retained while a
//! vault is unlocked — the master password itself is dropped as soon
//! as derivation completes.

use zeroize::Zeroize;

use super::kdf::KEY_LEN;

/// A wrapper around the 32-byte vault key that automatically zeroes
/// its memory when dropped.
///
/// Holds the key for the unlocked session so it cannot linger after
/// the vault is locked or the engine goes away.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    /// Create a new `VaultKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to pass to the AEAD codec).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}
