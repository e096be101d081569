use thiserror::Error;

/// All errors that can occur in the vault engine.
///
/// Raw cryptographic library errors never leave this crate — every
/// crypto/codec failure is translated into one of these user-facing
/// kinds at the engine boundary.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Input validation ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Master password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("Passwords do not match")]
    Mismatch,

    // --- Unlock ---
    #[error("Wrong password or corrupted vault")]
    WrongPassword,

    // --- Crypto errors ---
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Authentication tag did not verify. Wrong key and corrupted
    /// ciphertext are indistinguishable — the engine surfaces this
    /// as `WrongPassword`.
    #[error("Decryption failed")]
    DecryptionFailed,

    // --- Persisted data ---
    #[error("Vault data is unreadable: {0}")]
    MalformedBlob(String),

    #[error("Vault storage is unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Failed to persist vault: {0}")]
    PersistenceFailed(String),

    // --- State machine ---
    #[error("Operation not allowed in the {0} state")]
    InvalidState(&'static str),

    #[error("No entry with id {0}")]
    EntryNotFound(uuid::Uuid),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Convenience type alias for vault results.
pub type Result<T> = std::result::Result<T, VaultError>;
