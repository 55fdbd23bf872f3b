#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::time::Duration;

use envsync_core::errors::ExErrorKind;
use envsync_core::model::{Entry, Selection};
use envsync_core::DiffStatus;
use envsync_engine::PhaseTimeouts;
use envsync_store::write_snapshot;
use tempfile::TempDir;

use common::{blog, orchestrator};

// ---------------------------------------------------------------------------
// compare
// ---------------------------------------------------------------------------

#[test]
fn test_compare_identical_snapshots_rejected() {
    let err = orchestrator().compare(&blog(), &blog()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_compare_reports_new_and_modified() {
    let mut target = blog();
    target.entries.retain(|e| e.id != "page-1");
    target.entries[0] = target.entries[0]
        .clone()
        .with_field("title", "en", "Old title");

    let comparison = orchestrator().compare(&blog(), &target).unwrap();
    assert_eq!(comparison.count(DiffStatus::New), 1);
    assert_eq!(comparison.count(DiffStatus::Modified), 1);
    assert_eq!(comparison.count(DiffStatus::Deleted), 0);
    let modified = comparison
        .entries
        .iter()
        .find(|d| d.status == DiffStatus::Modified)
        .unwrap();
    assert_eq!(modified.entry_id, "post-1");
    assert_eq!(modified.changed_fields, vec!["title".to_string()]);
}

#[test]
fn test_compare_validates_both_sides() {
    let mut broken = blog();
    broken.entries.push(Entry::new("post-1", "post"));
    let err = orchestrator().compare(&blog(), &broken).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidSnapshot);
}

// ---------------------------------------------------------------------------
// resolve_selection
// ---------------------------------------------------------------------------

#[test]
fn test_empty_selection_rejected() {
    let err = orchestrator()
        .resolve_selection(&Selection::new().with_locale("en"), blog())
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::EmptySelection);
}

#[test]
fn test_unknown_locale_rejected() {
    let selection = Selection::new().with_content_type("post").with_locale("xx");
    let err = orchestrator()
        .resolve_selection(&selection, blog())
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(err.entity_id(), Some("xx"));
}

#[test]
fn test_selection_pulls_in_dependencies() {
    let selection = Selection::new().with_entry("post-2").with_locale("en");
    let out = orchestrator().resolve_selection(&selection, blog()).unwrap();

    let ids: Vec<&str> = out.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["post-2", "author-1"]);
    let assets: Vec<&str> = out.assets.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(assets, vec!["img-2"]);
    let types: Vec<&str> = out.content_types.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(types, vec!["post", "author"]);
}

#[tokio::test]
async fn test_resolved_snapshot_applies_cleanly() {
    let selection = Selection::new().with_content_type("post");
    let narrowed = orchestrator().resolve_selection(&selection, blog()).unwrap();
    let client = common::empty_target();
    let report = orchestrator().apply(narrowed, &client).await.unwrap();

    assert!(!report.has_failures(), "{:?}", report.failed);
    assert!(client.entry("page-1").is_none());
    assert!(client.entry("author-1").is_some());
}

// ---------------------------------------------------------------------------
// load_snapshot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_load_snapshot_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("export.json");
    write_snapshot(&path, &blog()).unwrap();

    let loaded = orchestrator().load_snapshot(&path).await.unwrap();
    assert_eq!(loaded, blog());
}

#[tokio::test]
async fn test_load_snapshot_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = orchestrator()
        .load_snapshot(&dir.path().join("absent.json"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Io);
    assert!(err.run_id().is_some());
}

#[tokio::test]
async fn test_load_snapshot_respects_timeout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("export.json");
    write_snapshot(&path, &blog()).unwrap();

    let timeouts = PhaseTimeouts {
        load: Duration::ZERO,
        preflight: Duration::from_secs(1),
        apply: Duration::from_secs(1),
    };
    let result = orchestrator()
        .with_timeouts(timeouts)
        .load_snapshot(&path)
        .await;
    // a zero budget may still win the race on a fast machine
    if let Err(err) = result {
        assert_eq!(err.kind(), ExErrorKind::Timeout);
    }
}
