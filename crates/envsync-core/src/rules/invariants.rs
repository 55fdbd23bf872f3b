use std::collections::HashSet;

use crate::model::Snapshot;

/// Codes of every locale flagged as default
pub fn find_default_locales(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .locales
        .iter()
        .filter(|l| l.default)
        .map(|l| l.code.clone())
        .collect()
}

/// Ids that occur more than once within one record kind
///
/// Returns (kind, id) tuples in first-repeat order
pub fn find_duplicate_ids(snapshot: &Snapshot) -> Vec<(String, String)> {
    let mut duplicates = Vec::new();

    let kinds: [(&str, Vec<&str>); 4] = [
        (
            "content type",
            snapshot.content_types.iter().map(|c| c.id.as_str()).collect(),
        ),
        ("entry", snapshot.entries.iter().map(|e| e.id.as_str()).collect()),
        ("asset", snapshot.assets.iter().map(|a| a.id.as_str()).collect()),
        ("locale", snapshot.locales.iter().map(|l| l.code.as_str()).collect()),
    ];

    for (kind, ids) in kinds {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                duplicates.push((kind.to_string(), id.to_string()));
            }
        }
    }

    duplicates
}

/// Entries whose content type is not part of the snapshot
///
/// Returns (entry_id, content_type_id) tuples
pub fn find_entries_without_content_type(snapshot: &Snapshot) -> Vec<(String, String)> {
    let known: HashSet<&str> = snapshot
        .content_types
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    snapshot
        .entries
        .iter()
        .filter(|e| !known.contains(e.content_type_id.as_str()))
        .map(|e| (e.id.clone(), e.content_type_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentType, Entry, Locale};

    #[test]
    fn test_duplicates_are_per_kind() {
        let snapshot = Snapshot {
            content_types: vec![ContentType::new("x", "X")],
            entries: vec![Entry::new("x", "x"), Entry::new("x", "x")],
            ..Snapshot::default()
        };
        assert_eq!(
            find_duplicate_ids(&snapshot),
            vec![("entry".to_string(), "x".to_string())]
        );
    }

    #[test]
    fn test_default_locales_listed() {
        let snapshot = Snapshot {
            locales: vec![
                Locale::new("en", "English").as_default(),
                Locale::new("fr", "French").as_default(),
            ],
            ..Snapshot::default()
        };
        assert_eq!(find_default_locales(&snapshot), vec!["en", "fr"]);
    }

    #[test]
    fn test_entries_without_content_type() {
        let snapshot = Snapshot {
            content_types: vec![ContentType::new("post", "Post")],
            entries: vec![Entry::new("e1", "post"), Entry::new("e2", "page")],
            ..Snapshot::default()
        };
        assert_eq!(
            find_entries_without_content_type(&snapshot),
            vec![("e2".to_string(), "page".to_string())]
        );
    }
}
