//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The iteration count is fixed and high so that deriving a key takes
//! human-perceptible but bounded time, making offline brute-force
//! expensive. The same password + salt always derives the same key —
//! unlocking succeeds or fails purely on whether the derived key
//! authenticates the stored ciphertext.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::errors::{Result, VaultError};

/// Length of the key-derivation salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Floor on the PBKDF2 iteration count.
const MIN_ITERATIONS: u32 = 100_000;

/// Configurable PBKDF2 parameters.
///
/// Only the iteration count is tunable; the hash (HMAC-SHA256) and
/// output length are fixed by the vault format.
#[derive(Debug, Clone, Copy)]
pub struct KdfParams {
    /// Number of PBKDF2 iterations (default: 210 000).
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: 210_000,
        }
    }
}

/// Derive a 32-byte vault key from a master password and salt.
///
/// Uses the default iteration count. Prefer `derive_key_with_params`
/// when the caller carries explicit `KdfParams`.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> Result<[u8; KEY_LEN]> {
    derive_key_with_params(password, salt, &KdfParams::default())
}

/// Derive a 32-byte vault key with an explicit iteration count.
///
/// The same password + salt + iterations will always produce the same
/// key. Rejects empty passwords before touching any crypto, and
/// enforces the iteration floor so a misconfigured caller cannot
/// silently weaken the derivation.
pub fn derive_key_with_params(
    password: &str,
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<[u8; KEY_LEN]> {
    if password.is_empty() {
        return Err(VaultError::InvalidInput(
            "password must not be empty".into(),
        ));
    }
    if params.iterations < MIN_ITERATIONS {
        return Err(VaultError::KeyDerivationFailed(format!(
            "iteration count must be at least {MIN_ITERATIONS} (got {})",
            params.iterations
        )));
    }

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, params.iterations, &mut key);
    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
///
/// Called once at vault creation. The salt stays fixed for the
/// lifetime of a master password — regenerating it would make the
/// existing ciphertext underivable.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}
