#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use envsync_core::errors::{ExErrorKind, SyncError};
use envsync_core::logging_facility::test_capture::init_test_capture;
use envsync_core::model::Selection;
use envsync_core::{log_op_end, log_op_error, log_op_start};
use envsync_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    capture.assert_event_exists(op_name, EVENT_START);
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = SyncError::EntryNotFound {
        entry_id: "e1".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for_op(op_name);
    let error_event = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");

    assert_eq!(error_event.field("err_code"), Some("ERR_NOT_FOUND"));
    assert_eq!(
        error_event.field("err_kind"),
        Some(format!("{:?}", ExErrorKind::NotFound).as_str())
    );
}

#[test]
fn test_log_macros_with_multiple_fields() {
    let capture = init_test_capture();
    let op_name = "test_log_macros_fields_unique_4";

    log_op_start!(op_name, entry_id = "e123", locale = "en");

    let events = capture.events_for_op(op_name);
    assert_eq!(events[0].field("entry_id"), Some("e123"));
    assert_eq!(events[0].field("locale"), Some("en"));
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();
    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}

#[test]
fn test_engine_phases_emit_start_and_end() {
    let capture = init_test_capture();
    let snapshot = common::blog();

    let before = capture.count_events(|e| e.op.as_deref() == Some("filter"));
    let _ = envsync_core::filter(snapshot.clone(), &Selection::new().with_content_type("page"));
    let _ = envsync_core::compare(&snapshot, &snapshot);

    let filter_events = capture.events_for_op("filter");
    assert_eq!(filter_events.len() - before, 2);
    assert_eq!(filter_events[before].event.as_deref(), Some(EVENT_START));
    assert_eq!(filter_events[before + 1].event.as_deref(), Some(EVENT_END));

    let diff_end = capture
        .events_for_op("diff")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .last()
        .expect("diff end event");
    assert_eq!(diff_end.field("diff_count"), Some("0"));
}
