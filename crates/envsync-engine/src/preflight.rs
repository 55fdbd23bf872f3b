//! Content-type preflight
//!
//! Brings the target's schema in line with the snapshot before any entry is
//! written. Content types are never deleted. The store refuses to drop a
//! field that has not first been omitted, and refuses to change a field's
//! type, so either case is a structural conflict for that content type:
//! nothing is written for it and its entries are skipped.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use envsync_core::errors::{ExError, ExErrorKind, SyncError};
use envsync_core::model::{ContentType, Snapshot};
use envsync_core::{log_op_end, log_op_error, log_op_start};

use crate::client::TargetClient;
use crate::replicator::RecordKind;
use crate::report::FailedRecord;
use crate::retry::{with_retry, RetryPolicy};

/// What the preflight decided for one content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTypePlan {
    Create,
    /// Replace the target's definition at this version
    Update { current_version: u64 },
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTypeOutcome {
    Created,
    Updated,
    Unchanged,
    Conflict,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeAction {
    pub content_type_id: String,
    pub outcome: ContentTypeOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreflightOutcome {
    pub actions: Vec<ContentTypeAction>,
    /// Content types whose entries must not be written
    pub blocked: BTreeSet<String>,
    pub failures: Vec<FailedRecord>,
}

/// Decide how to bring `target` in line with `source`
///
/// # Errors
///
/// - `FieldRemovalBlocked` when the target has a field the source lacks and
///   that field is not omitted
/// - `FieldTypeChanged` when a field keeps its id but changes type
pub fn plan_content_type(
    source: &ContentType,
    target: Option<&ContentType>,
) -> Result<ContentTypePlan, SyncError> {
    let Some(target) = target else {
        return Ok(ContentTypePlan::Create);
    };
    if source.structurally_equal(target) {
        return Ok(ContentTypePlan::Unchanged);
    }

    for field in &target.fields {
        match source.field(&field.id) {
            None if field.omitted != Some(true) => {
                return Err(SyncError::FieldRemovalBlocked {
                    content_type_id: source.id.clone(),
                    field_id: field.id.clone(),
                });
            }
            Some(wanted) if wanted.field_type != field.field_type => {
                return Err(SyncError::FieldTypeChanged {
                    content_type_id: source.id.clone(),
                    field_id: field.id.clone(),
                    from: field.field_type.clone(),
                    to: wanted.field_type.clone(),
                });
            }
            _ => {}
        }
    }

    Ok(ContentTypePlan::Update {
        current_version: target.version,
    })
}

/// Create or update every snapshot content type on the target
///
/// # Errors
///
/// Only when the target's content types cannot be listed; per-type failures
/// are collected in the outcome.
pub async fn run_preflight(
    snapshot: &Snapshot,
    client: &dyn TargetClient,
    retry: &RetryPolicy,
) -> Result<PreflightOutcome, ExError> {
    log_op_start!(
        "preflight",
        content_type_count = snapshot.content_types.len() as u64
    );
    let start = std::time::Instant::now();

    let existing = with_retry(retry, "list_content_types", move || client.list_content_types())
        .await
        .map_err(|e| {
            let e = e.with_op("preflight");
            log_op_error!(
                "preflight",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;
    let by_id: HashMap<&str, &ContentType> =
        existing.iter().map(|ct| (ct.id.as_str(), ct)).collect();

    let mut outcome = PreflightOutcome::default();
    for content_type in &snapshot.content_types {
        let target = by_id.get(content_type.id.as_str()).copied();
        let result = match plan_content_type(content_type, target) {
            Ok(ContentTypePlan::Unchanged) => Ok(ContentTypeOutcome::Unchanged),
            Ok(ContentTypePlan::Create) => apply_plan(content_type, None, client, retry)
                .await
                .map(|()| ContentTypeOutcome::Created),
            Ok(ContentTypePlan::Update { current_version }) => {
                apply_plan(content_type, Some(current_version), client, retry)
                    .await
                    .map(|()| ContentTypeOutcome::Updated)
            }
            Err(conflict) => Err(ExError::from(conflict).with_op("preflight")),
        };

        let outcome_kind = match result {
            Ok(kind) => {
                tracing::debug!(
                    op = "preflight",
                    content_type_id = %content_type.id,
                    outcome = ?kind,
                    "content type reconciled"
                );
                kind
            }
            Err(err) => {
                tracing::warn!(
                    op = "preflight",
                    content_type_id = %content_type.id,
                    err_code = err.code(),
                    "content type not reconciled; its entries will be skipped: {}",
                    err
                );
                outcome.blocked.insert(content_type.id.clone());
                outcome.failures.push(FailedRecord::new(
                    content_type.id.clone(),
                    RecordKind::ContentType,
                    &err,
                ));
                if err.kind() == ExErrorKind::StructuralConflict {
                    ContentTypeOutcome::Conflict
                } else {
                    ContentTypeOutcome::Failed
                }
            }
        };
        outcome.actions.push(ContentTypeAction {
            content_type_id: content_type.id.clone(),
            outcome: outcome_kind,
        });
    }

    log_op_end!(
        "preflight",
        duration_ms = start.elapsed().as_millis() as u64,
        blocked_count = outcome.blocked.len() as u64
    );
    Ok(outcome)
}

async fn apply_plan(
    content_type: &ContentType,
    current_version: Option<u64>,
    client: &dyn TargetClient,
    retry: &RetryPolicy,
) -> Result<(), ExError> {
    let saved = with_retry(retry, "upsert_content_type", move || {
        client.upsert_content_type(content_type, current_version)
    })
    .await?;
    let saved = &saved;
    with_retry(retry, "publish_content_type", move || {
        client.publish_content_type(saved)
    })
    .await?;
    Ok(())
}
