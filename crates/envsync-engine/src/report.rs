//! Migration report
//!
//! The outcome of one `apply` run. Per-record failures are collected here
//! instead of aborting the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use envsync_core::errors::ExError;
use envsync_core_types::RunId;

use crate::preflight::ContentTypeAction;
use crate::replicator::{AppliedAction, RecordKind};

/// A record that could not be migrated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRecord {
    /// Id of the entry, asset or content type
    pub entry_id: String,
    pub kind: RecordKind,
    /// Stable `ERR_*` code
    pub code: String,
    pub error: String,
}

impl FailedRecord {
    pub fn new(id: impl Into<String>, kind: RecordKind, err: &ExError) -> Self {
        Self {
            entry_id: id.into(),
            kind,
            code: err.code().to_string(),
            error: err.to_string(),
        }
    }
}

/// Locale rename applied before replication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleRemap {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Records that did not exist on the target
    pub created: u64,
    /// Records that existed and were overwritten
    pub updated: u64,
    /// Records that ended with a publish step
    pub published: u64,
    /// Records never attempted (blocked content type or deadline)
    pub skipped: u64,
    pub failed: Vec<FailedRecord>,
    pub actions: Vec<AppliedAction>,
    pub content_types: Vec<ContentTypeAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remapped_locale: Option<LocaleRemap>,
    pub timed_out: bool,
}

impl MigrationReport {
    pub fn new(run_id: &RunId) -> Self {
        Self {
            run_id: run_id.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            created: 0,
            updated: 0,
            published: 0,
            skipped: 0,
            failed: Vec::new(),
            actions: Vec::new(),
            content_types: Vec::new(),
            remapped_locale: None,
            timed_out: false,
        }
    }

    pub fn record(&mut self, action: AppliedAction) {
        if action.target_existed {
            self.updated += 1;
        } else {
            self.created += 1;
        }
        if action.published() {
            self.published += 1;
        }
        self.actions.push(action);
    }

    pub fn record_failure(&mut self, failure: FailedRecord) {
        self.failed.push(failure);
    }

    pub fn skip(&mut self, count: u64) {
        self.skipped += count;
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    /// One-line summary for operators
    pub fn summary(&self) -> String {
        let mut line = format!(
            "created {}, updated {}, published {}, skipped {}, failed {}",
            self.created,
            self.updated,
            self.published,
            self.skipped,
            self.failed.len()
        );
        if self.timed_out {
            line.push_str(" (timed out)");
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replicator::ReplicationStep;
    use envsync_core::errors::ExErrorKind;
    use envsync_core::model::SysStatus;
    use serde_json::json;

    fn action(existed: bool, steps: Vec<ReplicationStep>) -> AppliedAction {
        AppliedAction {
            record_id: "e1".to_string(),
            kind: RecordKind::Entry,
            source_status: SysStatus::Published,
            steps,
            target_existed: existed,
        }
    }

    #[test]
    fn test_counts_follow_actions() {
        let mut report = MigrationReport::new(&RunId::new());
        report.record(action(false, vec![ReplicationStep::Create, ReplicationStep::Publish]));
        report.record(action(true, vec![ReplicationStep::Update]));
        assert_eq!((report.created, report.updated, report.published), (1, 1, 1));
        assert!(!report.has_failures());
    }

    #[test]
    fn test_failure_serialises_with_entry_id_and_code() {
        let mut report = MigrationReport::new(&RunId::new());
        let err = ExError::new(ExErrorKind::VersionMismatch).with_message("stale");
        report.record_failure(FailedRecord::new("e9", RecordKind::Entry, &err));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["failed"][0]["entryId"], json!("e9"));
        assert_eq!(value["failed"][0]["code"], json!("ERR_VERSION_MISMATCH"));
        assert_eq!(value["timedOut"], json!(false));
        assert!(report.summary().contains("failed 1"));
    }
}
