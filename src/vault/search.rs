//! Search and tag filtering over the decrypted collection.
//!
//! Pure functions — no persistence implication, usable only while the
//! engine is unlocked (that is when a decrypted slice exists at all).

use super::entry::VaultEntry;

/// Filter entries by substring query and tag.
///
/// An entry matches when ANY of label, username, url, or notes
/// contains `query` case-insensitively AND (`tag` is `None`, meaning
/// "All", OR the entry's tag list contains the selected tag exactly).
/// An empty query matches every entry.
pub fn filter_entries<'a>(
    entries: &'a [VaultEntry],
    query: &str,
    tag: Option<&str>,
) -> Vec<&'a VaultEntry> {
    let query = query.to_lowercase();

    entries
        .iter()
        .filter(|entry| matches_query(entry, &query))
        .filter(|entry| match tag {
            Some(tag) => entry.tags.iter().any(|t| t == tag),
            None => true,
        })
        .collect()
}

/// All distinct tags across the collection, in first-seen order.
///
/// Feeds the tag-filter dropdown.
pub fn all_tags(entries: &[VaultEntry]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for entry in entries {
        for tag in &entry.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
    }
    tags
}

fn matches_query(entry: &VaultEntry, lowered_query: &str) -> bool {
    if lowered_query.is_empty() {
        return true;
    }

    let haystacks = [
        Some(entry.label.as_str()),
        Some(entry.username.as_str()),
        entry.url.as_deref(),
        entry.notes.as_deref(),
    ];

    haystacks
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(lowered_query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::entry::EntryDraft;

    fn entry(label: &str, username: &str, url: Option<&str>, tags: &[&str]) -> VaultEntry {
        EntryDraft {
            label: label.into(),
            username: username.into(),
            password: "pw".into(),
            url: url.map(Into::into),
            notes: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            favorite: false,
        }
        .into_entry()
    }

    #[test]
    fn empty_query_matches_all() {
        let entries = vec![entry("A", "a", None, &[]), entry("B", "b", None, &[])];
        assert_eq!(filter_entries(&entries, "", None).len(), 2);
    }

    #[test]
    fn query_is_case_insensitive() {
        let entries = vec![entry("GitHub", "dev@example.com", None, &[])];
        assert_eq!(filter_entries(&entries, "github", None).len(), 1);
        assert_eq!(filter_entries(&entries, "GITHUB", None).len(), 1);
        assert_eq!(filter_entries(&entries, "gitlab", None).len(), 0);
    }

    #[test]
    fn query_searches_url_and_notes() {
        let mut with_notes = entry("Bank", "me", None, &[]);
        with_notes.notes = Some("shared with Alice".into());
        let entries = vec![
            entry("Site", "user", Some("https://example.com"), &[]),
            with_notes,
        ];

        let by_url = filter_entries(&entries, "example.com", None);
        assert_eq!(by_url.len(), 1);
        assert_eq!(by_url[0].label, "Site");

        let by_notes = filter_entries(&entries, "alice", None);
        assert_eq!(by_notes.len(), 1);
        assert_eq!(by_notes[0].label, "Bank");
    }

    #[test]
    fn query_does_not_search_password() {
        let mut e = entry("Site", "user", None, &[]);
        e.password = "supersecret".into();
        let entries = vec![e];
        assert_eq!(filter_entries(&entries, "supersecret", None).len(), 0);
    }

    #[test]
    fn tag_filter_requires_exact_membership() {
        let entries = vec![
            entry("One", "u", None, &["Production"]),
            entry("Two", "u", None, &["Staging"]),
        ];

        let filtered = filter_entries(&entries, "", Some("Production"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].label, "One");
    }

    #[test]
    fn query_and_tag_combine_with_and() {
        let entries = vec![
            entry("Mail prod", "u", None, &["Production"]),
            entry("Mail staging", "u", None, &["Staging"]),
        ];

        let filtered = filter_entries(&entries, "mail", Some("Staging"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].label, "Mail staging");
    }

    #[test]
    fn all_tags_in_first_seen_order() {
        let entries = vec![
            entry("A", "u", None, &["Work", "Email"]),
            entry("B", "u", None, &["Email", "Personal"]),
        ];
        assert_eq!(all_tags(&entries), vec!["Work", "Email", "Personal"]);
    }
}
