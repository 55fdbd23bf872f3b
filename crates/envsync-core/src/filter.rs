//! Selection filter.
//!
//! Narrows a snapshot to the operator's selection in two passes:
//!
//! 1. **Records**: the selected entries (or, when no entry is picked, every
//!    entry of the selected content types), plus their dependency closure,
//!    plus the content types those need. Unreferenced assets are pruned.
//! 2. **Locales**: values under unselected locale keys are stripped.
//!
//! The record pass runs first, over unstripped values, because a reference
//! may live only under a locale that is about to be removed.

use std::collections::BTreeSet;

use crate::model::{LocalizedFields, Selection, Snapshot};
use crate::resolver::resolve;
use crate::{log_op_end, log_op_start};

/// Restrict `snapshot` to `selection`
///
/// Entries and assets are never dropped by locale stripping, even when no
/// value survives; selecting a record and then a locale it has no content
/// in still migrates the record.
pub fn filter(snapshot: Snapshot, selection: &Selection) -> Snapshot {
    log_op_start!(
        "filter",
        entry_count = snapshot.entries.len() as u64,
        selected_entries = selection.entry_ids.len() as u64,
        selected_content_types = selection.content_type_ids.len() as u64,
        selected_locales = selection.locale_codes.len() as u64
    );
    let start = std::time::Instant::now();

    let mut filtered = if selection.selects_records() {
        restrict_records(snapshot, selection)
    } else {
        snapshot
    };

    if !selection.locale_codes.is_empty() {
        for entry in &mut filtered.entries {
            strip_locales(&mut entry.fields, &selection.locale_codes);
        }
        for asset in &mut filtered.assets {
            strip_locales(&mut asset.fields, &selection.locale_codes);
        }
    }

    log_op_end!(
        "filter",
        duration_ms = start.elapsed().as_millis() as u64,
        entry_count = filtered.entries.len() as u64,
        asset_count = filtered.assets.len() as u64,
        content_type_count = filtered.content_types.len() as u64
    );

    filtered
}

fn restrict_records(snapshot: Snapshot, selection: &Selection) -> Snapshot {
    // Picked entries narrow the selected types; they never widen to siblings
    let seeds: BTreeSet<String> = if selection.entry_ids.is_empty() {
        snapshot
            .entries
            .iter()
            .filter(|e| selection.content_type_ids.contains(&e.content_type_id))
            .map(|e| e.id.clone())
            .collect()
    } else {
        selection.entry_ids.clone()
    };

    let resolved = resolve(seeds, &snapshot);

    let wanted_types: BTreeSet<&String> = selection
        .content_type_ids
        .iter()
        .chain(resolved.content_type_ids.iter())
        .collect();
    let content_types: Vec<_> = snapshot
        .content_types
        .into_iter()
        .filter(|ct| wanted_types.contains(&ct.id))
        .collect();
    let kept_types: BTreeSet<&str> = content_types.iter().map(|ct| ct.id.as_str()).collect();

    let mut entries = Vec::with_capacity(resolved.entries.len());
    for entry in resolved.entries {
        if kept_types.contains(entry.content_type_id.as_str()) {
            entries.push(entry);
        } else {
            tracing::warn!(
                op = "filter",
                entry_id = %entry.id,
                content_type_id = %entry.content_type_id,
                "content type not in snapshot; entry dropped"
            );
        }
    }

    let editor_interfaces = snapshot
        .editor_interfaces
        .into_iter()
        .filter(|ei| kept_types.contains(ei.content_type_id.as_str()))
        .collect();

    Snapshot {
        content_types,
        entries,
        assets: resolved.assets,
        locales: snapshot.locales,
        editor_interfaces,
    }
}

/// Remove every locale key outside `keep`; field keys themselves stay
fn strip_locales(fields: &mut LocalizedFields, keep: &BTreeSet<String>) {
    for values in fields.values_mut() {
        values.retain(|code, _| keep.contains(code));
    }
}
