//! The persisted vault record.
//!
//! `EncryptedBlob` is the only form that ever crosses the engine
//! boundary. It carries no plaintext secret material: ciphertext,
//! nonce, and key-derivation salt (all base64 in JSON), plus two
//! plaintext metadata fields so a UI can show stats without
//! decrypting anything.

use serde::{Deserialize, Serialize};

/// The opaque persisted vault record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedBlob {
    /// AES-256-GCM ciphertext of the serialized entry list, auth tag
    /// appended. Base64 in JSON.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub cipher: Vec<u8>,

    /// 96-bit nonce, fresh per encryption. Base64 in JSON.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub iv: Vec<u8>,

    /// Key-derivation salt, fixed for the lifetime of a master
    /// password. Base64 in JSON.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// Milliseconds since epoch of the last successful encryption.
    pub last_updated: i64,

    /// Entry count at encryption time. Plaintext metadata for UI
    /// stats.
    pub entry_count: usize,
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
