//! Locale remapper.
//!
//! Renames one locale code across a whole snapshot: the locale list, every
//! entry and asset field, and per-locale default values of content-type
//! fields. Applied when a snapshot captured under one default locale is
//! replayed into a store whose default differs.

use crate::errors::{Result, SyncError};
use crate::model::{Locale, LocaleValues, LocalizedFields, Snapshot};
use crate::{log_op_end, log_op_start};

/// Default locale of a snapshot
///
/// # Errors
///
/// - `MissingDefaultLocale` / `MultipleDefaultLocales` when the snapshot does
///   not flag exactly one locale as default
pub fn default_locale(snapshot: &Snapshot) -> Result<&Locale> {
    let defaults: Vec<&Locale> = snapshot.locales.iter().filter(|l| l.default).collect();
    match defaults.as_slice() {
        [only] => Ok(only),
        [] => Err(SyncError::MissingDefaultLocale),
        many => Err(SyncError::MultipleDefaultLocales {
            codes: many.iter().map(|l| l.code.clone()).collect(),
        }),
    }
}

/// Rename locale `from` to `to` throughout a copy of `snapshot`
///
/// Values already stored under `to` are overwritten; a locale already
/// configured as `to` is replaced by the renamed one. `from == to` returns
/// an unchanged copy.
pub fn remap(snapshot: &Snapshot, from: &str, to: &str) -> Snapshot {
    log_op_start!("remap", from = from, to = to);
    let start = std::time::Instant::now();

    if from == to {
        log_op_end!(
            "remap",
            duration_ms = start.elapsed().as_millis() as u64,
            moved_values = 0u64
        );
        return snapshot.clone();
    }

    let mut out = snapshot.clone();

    if out.locales.iter().any(|l| l.code == from) {
        out.locales.retain(|l| l.code != to);
    }
    for locale in &mut out.locales {
        if locale.code == from {
            locale.code = to.to_string();
        }
        if locale.fallback_code.as_deref() == Some(from) {
            locale.fallback_code = Some(to.to_string());
        }
    }

    let mut moved = 0u64;
    for entry in &mut out.entries {
        moved += rename_fields(&mut entry.fields, from, to);
    }
    for asset in &mut out.assets {
        moved += rename_fields(&mut asset.fields, from, to);
    }

    for ct in &mut out.content_types {
        for field in &mut ct.fields {
            if let Some(defaults) = field.default_value.as_mut() {
                if let Some(value) = defaults.remove(from) {
                    defaults.insert(to.to_string(), value);
                }
            }
        }
    }

    log_op_end!(
        "remap",
        duration_ms = start.elapsed().as_millis() as u64,
        moved_values = moved
    );

    out
}

fn rename_fields(fields: &mut LocalizedFields, from: &str, to: &str) -> u64 {
    fields
        .values_mut()
        .map(|values| rename_key(values, from, to))
        .filter(|moved| *moved)
        .count() as u64
}

fn rename_key(values: &mut LocaleValues, from: &str, to: &str) -> bool {
    match values.remove(from) {
        Some(value) => {
            values.insert(to.to_string(), value);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentType, Entry, Field};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn snapshot() -> Snapshot {
        let mut title = Field::new("title", "Symbol");
        title.default_value = Some(BTreeMap::from([("en-US".to_string(), json!("Untitled"))]));
        Snapshot {
            content_types: vec![ContentType::new("post", "Post").with_field(title)],
            entries: vec![Entry::new("e1", "post")
                .with_field("title", "en-US", "Hello")
                .with_field("title", "en-GB", "stale")
                .with_field("body", "de", "Hallo")],
            locales: vec![
                Locale::new("en-US", "English (US)").as_default(),
                Locale::new("en-GB", "English (UK)"),
                Locale {
                    fallback_code: Some("en-US".to_string()),
                    ..Locale::new("de", "German")
                },
            ],
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_remap_moves_values_and_overwrites() {
        let out = remap(&snapshot(), "en-US", "en-GB");
        let title = &out.entries[0].fields["title"];
        assert_eq!(title.len(), 1);
        assert_eq!(title["en-GB"].as_str(), Some("Hello"));
        assert_eq!(out.entries[0].fields["body"]["de"].as_str(), Some("Hallo"));
    }

    #[test]
    fn test_remap_renames_locale_and_fallbacks() {
        let out = remap(&snapshot(), "en-US", "en-GB");
        let codes: Vec<&str> = out.locales.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["en-GB", "de"]);
        assert!(out.locales[0].default);
        assert_eq!(out.locales[1].fallback_code.as_deref(), Some("en-GB"));
        assert_eq!(default_locale(&out).unwrap().code, "en-GB");
    }

    #[test]
    fn test_remap_renames_default_values() {
        let out = remap(&snapshot(), "en-US", "en-GB");
        let defaults = out.content_types[0].fields[0].default_value.as_ref().unwrap();
        assert_eq!(defaults.get("en-GB"), Some(&json!("Untitled")));
        assert!(!defaults.contains_key("en-US"));
    }

    #[test]
    fn test_remap_leaves_input_untouched() {
        let input = snapshot();
        let _ = remap(&input, "en-US", "fr");
        assert_eq!(input, snapshot());
    }

    #[test]
    fn test_remap_onto_itself_is_identity() {
        assert_eq!(remap(&snapshot(), "en-US", "en-US"), snapshot());
    }

    #[test]
    fn test_default_locale_errors() {
        let mut s = snapshot();
        s.locales[1].default = true;
        assert!(matches!(
            default_locale(&s),
            Err(SyncError::MultipleDefaultLocales { .. })
        ));
        s.locales.iter_mut().for_each(|l| l.default = false);
        assert_eq!(default_locale(&s), Err(SyncError::MissingDefaultLocale));
    }
}
