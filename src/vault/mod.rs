//! Vault module — encrypted credential storage.
//!
//! This module provides:
//! - `VaultEntry` and `EntryDraft` types with validation (`entry`)
//! - The persisted `EncryptedBlob` record (`blob`)
//! - The serialize + encrypt / decrypt + deserialize codec (`codec`)
//! - Pure search/tag filtering over the decrypted state (`search`)
//! - The lifecycle state machine, `VaultEngine` (`engine`)

pub mod blob;
pub mod codec;
pub mod engine;
pub mod entry;
pub mod search;

// Re-export the most commonly used items.
pub use blob::EncryptedBlob;
pub use engine::{VaultEngine, VaultState, MIN_PASSWORD_LEN};
pub use entry::{EntryDraft, VaultEntry};
pub use search::{all_tags, filter_entries};
