//! Credential entry types stored inside a vault.
//!
//! `VaultEntry` is the stored record; `EntryDraft` carries the
//! caller-editable fields for create/update and is validated before
//! any mutation touches the collection. Field names serialize as
//! camelCase because that is the record layout the persisted payload
//! uses.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, VaultError};

/// One stored credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEntry {
    /// Opaque unique identifier, assigned at creation, immutable.
    pub id: Uuid,

    /// Display + search key (e.g. "Work email").
    pub label: String,

    /// Account name or login.
    pub username: String,

    /// The secret itself. Any non-empty string.
    pub password: String,

    /// Optional site/service URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Optional free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Ordered, duplicate-free tag list used for filtering.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Pinned/starred flag.
    #[serde(default)]
    pub favorite: bool,

    /// Milliseconds since epoch, set on every create/update.
    pub last_updated: i64,
}

/// Caller-editable fields of an entry, used for both create and update.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub label: String,
    pub username: String,
    pub password: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub favorite: bool,
}

impl EntryDraft {
    /// Validate the draft and normalize its tags.
    ///
    /// Label, username, and password must be non-empty after trimming
    /// (the password is not trimmed — leading/trailing whitespace is a
    /// legitimate part of a secret). Tags are deduplicated preserving
    /// first-seen order; empty tags are dropped.
    pub fn validate(&mut self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(VaultError::InvalidInput("label must not be empty".into()));
        }
        if self.username.trim().is_empty() {
            return Err(VaultError::InvalidInput(
                "username must not be empty".into(),
            ));
        }
        if self.password.is_empty() {
            return Err(VaultError::InvalidInput(
                "password must not be empty".into(),
            ));
        }

        let mut seen: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags.drain(..) {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !seen.contains(&tag) {
                seen.push(tag);
            }
        }
        self.tags = seen;

        Ok(())
    }

    /// Build a brand-new entry from this draft.
    ///
    /// Assigns a fresh id and stamps the update time. The draft must
    /// already be validated.
    pub(crate) fn into_entry(self) -> VaultEntry {
        VaultEntry {
            id: Uuid::new_v4(),
            label: self.label,
            username: self.username,
            password: self.password,
            url: self.url,
            notes: self.notes,
            tags: self.tags,
            favorite: self.favorite,
            last_updated: now_millis(),
        }
    }

    /// Replace the editable fields of an existing entry in place.
    ///
    /// The id is preserved; the update time is re-stamped. The draft
    /// must already be validated.
    pub(crate) fn apply_to(self, entry: &mut VaultEntry) {
        entry.label = self.label;
        entry.username = self.username;
        entry.password = self.password;
        entry.url = self.url;
        entry.notes = self.notes;
        entry.tags = self.tags;
        entry.favorite = self.favorite;
        entry.last_updated = now_millis();
    }
}

/// Current wall-clock time as milliseconds since epoch.
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
