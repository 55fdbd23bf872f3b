//! Dependency resolver.
//!
//! Computes the closed set of entries and assets reachable from a seed set
//! of entry ids, plus the content types those entries need. Expansion is
//! gated by a visited set of entry ids, so reference cycles terminate.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::model::{Asset, Entry, LinkType, Snapshot};
use crate::walker::{walk_fields, Reference};
use crate::{log_op_end, log_op_start};

/// Dependency closure of a seed set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolved {
    /// Seed entries plus every entry reachable from them, in snapshot order
    pub entries: Vec<Entry>,
    /// Referenced assets present in the snapshot, in snapshot order
    pub assets: Vec<Asset>,
    pub content_type_ids: BTreeSet<String>,
    /// References (and seed ids) with no record in the snapshot
    pub unresolved: Vec<Reference>,
}

impl Resolved {
    pub fn entry_ids(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }
}

/// Resolve the transitive dependencies of `seed` within `snapshot`
///
/// Missing records are logged and reported in `unresolved`; a partial graph
/// is not an error.
pub fn resolve<I, S>(seed: I, snapshot: &Snapshot) -> Resolved
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let by_id = snapshot.entries_by_id();
    let asset_ids: HashSet<&str> = snapshot.assets.iter().map(|a| a.id.as_str()).collect();

    let mut visited: HashSet<String> = HashSet::new();
    let mut visited_assets: HashSet<String> = HashSet::new();
    let mut unresolved: BTreeSet<Reference> = BTreeSet::new();
    let mut queue: VecDeque<&Entry> = VecDeque::new();

    for id in seed {
        let id = id.into();
        if !visited.insert(id.clone()) {
            continue;
        }
        match by_id.get(id.as_str()) {
            Some(entry) => queue.push_back(*entry),
            None => {
                unresolved.insert(Reference {
                    kind: LinkType::Entry,
                    id,
                });
            }
        }
    }

    log_op_start!("resolve", seed_count = visited.len() as u64);
    let start = std::time::Instant::now();

    while let Some(entry) = queue.pop_front() {
        for reference in walk_fields(&entry.fields) {
            match reference.kind {
                LinkType::Entry => {
                    if visited.contains(&reference.id) {
                        continue;
                    }
                    match by_id.get(reference.id.as_str()) {
                        Some(target) => {
                            visited.insert(reference.id.clone());
                            queue.push_back(*target);
                        }
                        None => {
                            unresolved.insert(reference);
                        }
                    }
                }
                LinkType::Asset => {
                    if asset_ids.contains(reference.id.as_str()) {
                        visited_assets.insert(reference.id);
                    } else {
                        unresolved.insert(reference);
                    }
                }
            }
        }
    }

    for reference in &unresolved {
        tracing::warn!(
            op = "resolve",
            kind = reference.kind.as_str(),
            id = %reference.id,
            "reference not present in snapshot; skipped"
        );
    }

    let entries: Vec<Entry> = snapshot
        .entries
        .iter()
        .filter(|e| visited.contains(&e.id))
        .cloned()
        .collect();
    let assets: Vec<Asset> = snapshot
        .assets
        .iter()
        .filter(|a| visited_assets.contains(&a.id))
        .cloned()
        .collect();
    let content_type_ids = entries.iter().map(|e| e.content_type_id.clone()).collect();

    log_op_end!(
        "resolve",
        duration_ms = start.elapsed().as_millis() as u64,
        entry_count = entries.len() as u64,
        asset_count = assets.len() as u64,
        unresolved_count = unresolved.len() as u64
    );

    Resolved {
        entries,
        assets,
        content_type_ids,
        unresolved: unresolved.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Link;

    fn graph() -> Snapshot {
        Snapshot {
            entries: vec![
                Entry::new("post-1", "post")
                    .with_field("author", "en", Link::entry("author-1"))
                    .with_field("hero", "en", Link::asset("img-1")),
                Entry::new("author-1", "author")
                    .with_field("latest", "en", Link::entry("post-1"))
                    .with_field("ghost", "en", Link::entry("missing")),
                Entry::new("post-2", "post"),
            ],
            assets: vec![Asset::new("img-1"), Asset::new("img-unused")],
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_cycle_terminates_and_closes() {
        let resolved = resolve(["post-1"], &graph());
        let ids: Vec<&str> = resolved.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["post-1", "author-1"]);
        assert_eq!(resolved.assets.len(), 1);
        assert_eq!(resolved.assets[0].id, "img-1");
        assert_eq!(
            resolved.content_type_ids.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["author", "post"]
        );
    }

    #[test]
    fn test_missing_reference_is_reported_not_fatal() {
        let resolved = resolve(["post-1"], &graph());
        assert_eq!(
            resolved.unresolved,
            vec![Reference {
                kind: LinkType::Entry,
                id: "missing".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_seed_is_unresolved() {
        let resolved = resolve(["nope"], &graph());
        assert!(resolved.entries.is_empty());
        assert_eq!(resolved.unresolved.len(), 1);
    }

    #[test]
    fn test_empty_seed_resolves_nothing() {
        let resolved = resolve(Vec::<String>::new(), &graph());
        assert_eq!(resolved, Resolved::default());
    }
}
