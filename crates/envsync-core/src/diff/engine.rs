//! Snapshot diff computation engine.
//!
//! The entry point is [`compare`], which pairs entries and content types of
//! two snapshots by id and reports what the source would add, change or
//! remove relative to the target.

use std::collections::{BTreeSet, HashMap};

use crate::diff::model::{Comparison, ContentTypeDiffItem, DiffItem, DiffStatus};
use crate::model::{Entry, LocaleValues, LocalizedFields, Snapshot};
use crate::{log_op_end, log_op_start};

/// Substrings that mark a field as a display title, checked case-insensitively
const TITLE_HINTS: &[&str] = &["title", "name", "label", "headline", "slug", "header"];

/// Classify every entry of `source` against `target`
///
/// Output is in source order followed by target order; entries that are
/// equal on both sides are omitted.
pub fn diff_entries(source: &Snapshot, target: &Snapshot) -> Vec<DiffItem> {
    let target_by_id = target.entries_by_id();
    let source_ids: BTreeSet<&str> = source.entries.iter().map(|e| e.id.as_str()).collect();
    let source_default = source.default_locale().map(|l| l.code.as_str());
    let target_default = target.default_locale().map(|l| l.code.as_str());

    let mut items = Vec::new();

    for entry in &source.entries {
        match target_by_id.get(entry.id.as_str()) {
            None => items.push(DiffItem {
                entry_id: entry.id.clone(),
                content_type_id: entry.content_type_id.clone(),
                title: resolve_title(entry, source_default),
                status: DiffStatus::New,
                sys_status: entry.sys_status(),
                old_fields: None,
                new_fields: Some(entry.fields.clone()),
                changed_fields: Vec::new(),
            }),
            Some(existing) => {
                let changed = changed_fields(&entry.fields, &existing.fields);
                if changed.is_empty() {
                    continue;
                }
                items.push(DiffItem {
                    entry_id: entry.id.clone(),
                    content_type_id: entry.content_type_id.clone(),
                    title: resolve_title(entry, source_default),
                    status: DiffStatus::Modified,
                    sys_status: entry.sys_status(),
                    old_fields: Some(existing.fields.clone()),
                    new_fields: Some(entry.fields.clone()),
                    changed_fields: changed,
                });
            }
        }
    }

    for entry in &target.entries {
        if source_ids.contains(entry.id.as_str()) {
            continue;
        }
        items.push(DiffItem {
            entry_id: entry.id.clone(),
            content_type_id: entry.content_type_id.clone(),
            title: resolve_title(entry, target_default),
            status: DiffStatus::Deleted,
            sys_status: entry.sys_status(),
            old_fields: Some(entry.fields.clone()),
            new_fields: None,
            changed_fields: Vec::new(),
        });
    }

    items
}

/// Field names (over the union of both sides) whose locale maps differ
fn changed_fields(new: &LocalizedFields, old: &LocalizedFields) -> Vec<String> {
    let names: BTreeSet<&String> = new.keys().chain(old.keys()).collect();
    names
        .into_iter()
        .filter(|name| new.get(*name) != old.get(*name))
        .cloned()
        .collect()
}

/// Classify content types by structural equality
pub fn diff_content_types(source: &Snapshot, target: &Snapshot) -> Vec<ContentTypeDiffItem> {
    let target_by_id: HashMap<&str, _> = target
        .content_types
        .iter()
        .map(|ct| (ct.id.as_str(), ct))
        .collect();
    let source_ids: BTreeSet<&str> = source.content_types.iter().map(|ct| ct.id.as_str()).collect();

    let mut items = Vec::new();

    for ct in &source.content_types {
        match target_by_id.get(ct.id.as_str()) {
            None => items.push(ContentTypeDiffItem {
                content_type_id: ct.id.clone(),
                name: ct.name.clone(),
                status: DiffStatus::New,
                added_fields: ct.fields.iter().map(|f| f.id.clone()).collect(),
                removed_fields: Vec::new(),
                changed_fields: Vec::new(),
            }),
            Some(existing) if ct.structurally_equal(existing) => {}
            Some(existing) => {
                let mut added = Vec::new();
                let mut changed = Vec::new();
                for field in &ct.fields {
                    match existing.field(&field.id) {
                        None => added.push(field.id.clone()),
                        Some(other) if !field.same_shape(other) => changed.push(field.id.clone()),
                        Some(_) => {}
                    }
                }
                let mut removed: Vec<String> = existing
                    .fields
                    .iter()
                    .filter(|f| ct.field(&f.id).is_none())
                    .map(|f| f.id.clone())
                    .collect();
                added.sort();
                changed.sort();
                removed.sort();

                items.push(ContentTypeDiffItem {
                    content_type_id: ct.id.clone(),
                    name: ct.name.clone(),
                    status: DiffStatus::Modified,
                    added_fields: added,
                    removed_fields: removed,
                    changed_fields: changed,
                });
            }
        }
    }

    for ct in &target.content_types {
        if source_ids.contains(ct.id.as_str()) {
            continue;
        }
        items.push(ContentTypeDiffItem {
            content_type_id: ct.id.clone(),
            name: ct.name.clone(),
            status: DiffStatus::Deleted,
            added_fields: Vec::new(),
            removed_fields: ct.fields.iter().map(|f| f.id.clone()).collect(),
            changed_fields: Vec::new(),
        });
    }

    items
}

/// Configured locale codes plus every locale key used by any entry or asset
///
/// Content can carry values under locales that are no longer configured;
/// those still need to be selectable.
pub fn discover_locales(snapshot: &Snapshot) -> BTreeSet<String> {
    let mut codes = snapshot.locale_codes();
    let field_maps = snapshot
        .entries
        .iter()
        .map(|e| &e.fields)
        .chain(snapshot.assets.iter().map(|a| &a.fields));
    for fields in field_maps {
        for values in fields.values() {
            codes.extend(values.keys().cloned());
        }
    }
    codes
}

/// Display title of an entry
///
/// Title shown for an entry
///
/// 1. A field named exactly after a title hint (case-insensitive, hints in
///    priority order) with a string value
/// 2. The first field, in name order, whose name contains a hint
/// 3. The first field with a string value
/// 4. The entry id
pub fn resolve_title(entry: &Entry, default_locale: Option<&str>) -> String {
    let exact = TITLE_HINTS.iter().find_map(|hint| {
        entry
            .fields
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(hint))
            .find_map(|(_, values)| string_value(values, default_locale))
    });

    let hinted = exact.or_else(|| {
        entry.fields.iter().find_map(|(name, values)| {
            let lowered = name.to_lowercase();
            if TITLE_HINTS.iter().any(|hint| lowered.contains(hint)) {
                string_value(values, default_locale)
            } else {
                None
            }
        })
    });

    hinted
        .or_else(|| {
            entry
                .fields
                .values()
                .find_map(|values| string_value(values, default_locale))
        })
        .map(str::to_string)
        .unwrap_or_else(|| entry.id.clone())
}

/// String value of one field, preferring the default locale
fn string_value<'a>(values: &'a LocaleValues, default_locale: Option<&str>) -> Option<&'a str> {
    default_locale
        .and_then(|code| values.get(code))
        .and_then(|v| v.as_str())
        .or_else(|| values.values().find_map(|v| v.as_str()))
}

/// Sort items by title, then id, for display
pub fn sort_by_title(items: &mut [DiffItem]) {
    items.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.entry_id.cmp(&b.entry_id))
    });
}

/// Full comparison of two snapshots
pub fn compare(source: &Snapshot, target: &Snapshot) -> Comparison {
    log_op_start!(
        "diff",
        entry_count = source.entries.len() as u64,
        target_entry_count = target.entries.len() as u64
    );
    let start = std::time::Instant::now();

    let comparison = Comparison {
        entries: diff_entries(source, target),
        content_types: diff_content_types(source, target),
        available_locales: discover_locales(source),
    };

    log_op_end!(
        "diff",
        duration_ms = start.elapsed().as_millis() as u64,
        diff_count = comparison.entries.len() as u64,
        new_count = comparison.count(DiffStatus::New) as u64,
        modified_count = comparison.count(DiffStatus::Modified) as u64,
        deleted_count = comparison.count(DiffStatus::Deleted) as u64
    );

    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentType, Field, FieldValue, Link, Locale};
    use serde_json::json;

    fn snapshot_with(entries: Vec<Entry>) -> Snapshot {
        Snapshot {
            locales: vec![Locale::new("en", "English").as_default()],
            entries,
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_changed_fields_over_union() {
        let new = Entry::new("e1", "post")
            .with_field("title", "en", "A")
            .with_field("extra", "en", "x");
        let old = Entry::new("e1", "post").with_field("title", "en", "A");
        assert_eq!(changed_fields(&new.fields, &old.fields), vec!["extra".to_string()]);
    }

    #[test]
    fn test_locale_only_difference_is_modified() {
        let source = snapshot_with(vec![Entry::new("e1", "post")
            .with_field("title", "en", "A")
            .with_field("title", "fr", "Z")]);
        let target = snapshot_with(vec![Entry::new("e1", "post").with_field("title", "en", "A")]);
        let items = diff_entries(&source, &target);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, DiffStatus::Modified);
        assert_eq!(items[0].changed_fields, vec!["title".to_string()]);
    }

    #[test]
    fn test_version_counters_alone_are_not_a_change() {
        let source = snapshot_with(vec![Entry::new("e1", "post")
            .with_versions(9, Some(8))
            .with_field("title", "en", "A")]);
        let target = snapshot_with(vec![Entry::new("e1", "post").with_field("title", "en", "A")]);
        assert!(diff_entries(&source, &target).is_empty());
    }

    #[test]
    fn test_title_prefers_hinted_field() {
        let entry = Entry::new("e1", "post")
            .with_field("body", "en", "Long text")
            .with_field("internalName", "en", "Home page");
        assert_eq!(resolve_title(&entry, Some("en")), "Home page");
    }

    #[test]
    fn test_exact_title_field_beats_substring_match() {
        let entry = Entry::new("e1", "post")
            .with_field("internalName", "en", "zz-internal")
            .with_field("title", "en", "Real title");
        assert_eq!(resolve_title(&entry, Some("en")), "Real title");

        let named = Entry::new("e2", "author")
            .with_field("displayLabel", "en", "label text")
            .with_field("Name", "en", "Ada");
        assert_eq!(resolve_title(&named, Some("en")), "Ada");
    }

    #[test]
    fn test_title_prefers_default_locale() {
        let entry = Entry::new("e1", "post")
            .with_field("title", "de", "Hallo")
            .with_field("title", "en", "Hello");
        assert_eq!(resolve_title(&entry, Some("en")), "Hello");
        assert_eq!(resolve_title(&entry, None), "Hallo");
    }

    #[test]
    fn test_title_falls_back_to_any_string_then_id() {
        let entry = Entry::new("e1", "post")
            .with_field("count", "en", FieldValue::Scalar(json!(3)))
            .with_field("body", "en", "Body text");
        assert_eq!(resolve_title(&entry, Some("en")), "Body text");

        let linked = Entry::new("e2", "post").with_field("title", "en", Link::entry("e1"));
        assert_eq!(resolve_title(&linked, Some("en")), "e2");
    }

    #[test]
    fn test_discover_locales_includes_orphans() {
        let mut snapshot = snapshot_with(vec![Entry::new("e1", "post")
            .with_field("title", "en", "A")
            .with_field("title", "pt-BR", "B")]);
        snapshot.assets.push(crate::model::Asset::new("a1").with_field("title", "ja", "C"));

        let codes: Vec<String> = discover_locales(&snapshot).into_iter().collect();
        assert_eq!(codes, vec!["en", "ja", "pt-BR"]);
    }

    #[test]
    fn test_content_type_field_changes() {
        let source = Snapshot {
            content_types: vec![ContentType::new("post", "Post")
                .with_field(Field::new("title", "Symbol"))
                .with_field(Field::new("summary", "Text"))],
            ..Snapshot::default()
        };
        let mut changed_body = Field::new("title", "Text");
        changed_body.required = Some(true);
        let target = Snapshot {
            content_types: vec![ContentType::new("post", "Post")
                .with_field(changed_body)
                .with_field(Field::new("legacy", "Symbol"))],
            ..Snapshot::default()
        };

        let items = diff_content_types(&source, &target);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, DiffStatus::Modified);
        assert_eq!(items[0].added_fields, vec!["summary"]);
        assert_eq!(items[0].removed_fields, vec!["legacy"]);
        assert_eq!(items[0].changed_fields, vec!["title"]);
    }

    #[test]
    fn test_sort_by_title_is_case_insensitive() {
        let mut items = diff_entries(
            &snapshot_with(vec![
                Entry::new("1", "post").with_field("title", "en", "beta"),
                Entry::new("2", "post").with_field("title", "en", "Alpha"),
            ]),
            &Snapshot::default(),
        );
        sort_by_title(&mut items);
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "beta"]);
    }
}
