use crate::errors::{Result, SyncError};
use crate::model::Snapshot;

use super::invariants;

/// Validate a snapshot before it enters any phase
///
/// 1. Exactly one locale is flagged as default
/// 2. Ids are unique within each record kind
///
/// Entries whose content type is missing are tolerated here (partial
/// exports are expected) and logged at `warn`; the selection filter drops
/// them.
///
/// # Errors
/// Returns the first violation found.
pub fn validate_snapshot(snapshot: &Snapshot) -> Result<()> {
    let defaults = invariants::find_default_locales(snapshot);
    match defaults.len() {
        0 => return Err(SyncError::MissingDefaultLocale),
        1 => {}
        _ => return Err(SyncError::MultipleDefaultLocales { codes: defaults }),
    }

    if let Some((kind, id)) = invariants::find_duplicate_ids(snapshot).into_iter().next() {
        return Err(SyncError::DuplicateId { kind, id });
    }

    for (entry_id, content_type_id) in invariants::find_entries_without_content_type(snapshot) {
        tracing::warn!(
            op = "validate",
            entry_id = %entry_id,
            content_type_id = %content_type_id,
            "entry references a content type missing from the snapshot"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entry, Locale};

    #[test]
    fn test_valid_snapshot_passes() {
        let snapshot = Snapshot {
            locales: vec![Locale::new("en", "English").as_default()],
            entries: vec![Entry::new("e1", "post")],
            ..Snapshot::default()
        };
        assert_eq!(validate_snapshot(&snapshot), Ok(()));
    }

    #[test]
    fn test_missing_default_rejected() {
        let snapshot = Snapshot {
            locales: vec![Locale::new("en", "English")],
            ..Snapshot::default()
        };
        assert_eq!(
            validate_snapshot(&snapshot),
            Err(SyncError::MissingDefaultLocale)
        );
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let snapshot = Snapshot {
            locales: vec![Locale::new("en", "English").as_default()],
            entries: vec![Entry::new("e1", "post"), Entry::new("e1", "post")],
            ..Snapshot::default()
        };
        assert_eq!(
            validate_snapshot(&snapshot),
            Err(SyncError::DuplicateId {
                kind: "entry".to_string(),
                id: "e1".to_string()
            })
        );
    }
}
