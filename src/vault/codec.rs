//! Entry-collection codec: serialize + encrypt, decrypt + deserialize.
//!
//! The whole collection is one ciphertext — every re-encryption covers
//! every entry, so what is displayed and what is at rest can never
//! diverge partially.

use crate::crypto::encryption::{decrypt, encrypt, NONCE_LEN};
use crate::crypto::kdf::{KEY_LEN, SALT_LEN};
use crate::errors::{Result, VaultError};

use super::blob::EncryptedBlob;
use super::entry::{now_millis, VaultEntry};

/// Serialize `entries` to JSON and encrypt them under `key`.
///
/// A fresh nonce is generated inside `encrypt` on every call. The
/// salt is carried through unchanged — it belongs to the master
/// password, not to any one encryption.
pub fn seal(
    key: &[u8; KEY_LEN],
    salt: &[u8; SALT_LEN],
    entries: &[VaultEntry],
) -> Result<EncryptedBlob> {
    let plaintext = serde_json::to_vec(entries)
        .map_err(|e| VaultError::SerializationError(format!("entries: {e}")))?;

    let (iv, cipher) = encrypt(key, &plaintext)?;

    Ok(EncryptedBlob {
        cipher,
        iv: iv.to_vec(),
        salt: salt.to_vec(),
        last_updated: now_millis(),
        entry_count: entries.len(),
    })
}

/// Decrypt a blob and deserialize the entry collection.
///
/// Order and all fields round-trip exactly. An authentication failure
/// is `DecryptionFailed` (wrong key or tampered ciphertext — not told
/// apart); a post-decryption parse failure means the blob was written
/// wrong and surfaces as `MalformedBlob`.
pub fn open(key: &[u8; KEY_LEN], blob: &EncryptedBlob) -> Result<Vec<VaultEntry>> {
    let iv = nonce_from_blob(blob)?;

    let plaintext = decrypt(key, &iv, &blob.cipher)?;

    serde_json::from_slice(&plaintext)
        .map_err(|e| VaultError::MalformedBlob(format!("entry payload: {e}")))
}

/// Pull the fixed-size nonce out of a blob, rejecting bad lengths.
fn nonce_from_blob(blob: &EncryptedBlob) -> Result<[u8; NONCE_LEN]> {
    blob.iv
        .as_slice()
        .try_into()
        .map_err(|_| VaultError::MalformedBlob(format!("iv must be {NONCE_LEN} bytes")))
}

/// Pull the fixed-size salt out of a blob, rejecting bad lengths.
pub fn salt_from_blob(blob: &EncryptedBlob) -> Result<[u8; SALT_LEN]> {
    blob.salt
        .as_slice()
        .try_into()
        .map_err(|_| VaultError::MalformedBlob(format!("salt must be {SALT_LEN} bytes")))
}
