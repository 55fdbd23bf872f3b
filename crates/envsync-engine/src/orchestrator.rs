//! Migration orchestrator
//!
//! Sequences a run: load snapshots, compare, narrow to a selection, then
//! apply to the target. Validation and setup failures are returned as
//! errors before anything is written; once writing starts, every record is
//! isolated and the run always ends with a [`MigrationReport`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;

use envsync_core::diff::discover_locales;
use envsync_core::errors::{ExError, ExErrorKind, SyncError};
use envsync_core::model::{Entry, LinkType, Locale, Selection, Snapshot};
use envsync_core::{
    compare, default_locale, filter, log_op_end, log_op_error, log_op_start, remap,
    validate_snapshot, walk_fields, Comparison,
};
use envsync_core_types::RunContext;
use envsync_store::config::{RunConfig, TimeoutSettings};
use envsync_store::read_snapshot;

use crate::client::TargetClient;
use crate::preflight::run_preflight;
use crate::replicator::{replicate, Replicable};
use crate::report::{FailedRecord, LocaleRemap, MigrationReport};
use crate::retry::{with_retry, RetryPolicy};

/// Time limits per phase of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTimeouts {
    pub load: Duration,
    pub preflight: Duration,
    /// Deadline for the whole record-writing phase
    pub apply: Duration,
}

impl Default for PhaseTimeouts {
    fn default() -> Self {
        Self::from(&TimeoutSettings::default())
    }
}

impl From<&TimeoutSettings> for PhaseTimeouts {
    fn from(settings: &TimeoutSettings) -> Self {
        Self {
            load: Duration::from_secs(settings.load_secs),
            preflight: Duration::from_secs(settings.preflight_secs),
            apply: Duration::from_secs(settings.apply_secs),
        }
    }
}

/// Drives one run against one target
#[derive(Debug, Clone)]
pub struct Orchestrator {
    context: RunContext,
    retry: RetryPolicy,
    timeouts: PhaseTimeouts,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(RunContext::new())
    }
}

impl Orchestrator {
    pub fn new(context: RunContext) -> Self {
        Self {
            context,
            retry: RetryPolicy::default(),
            timeouts: PhaseTimeouts::default(),
        }
    }

    pub fn from_config(context: RunContext, config: &RunConfig) -> Self {
        Self {
            context,
            retry: RetryPolicy::from(&config.retry),
            timeouts: PhaseTimeouts::from(&config.timeouts),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeouts(mut self, timeouts: PhaseTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Read and validate a snapshot file within the load timeout
    ///
    /// # Errors
    ///
    /// - `Timeout` when the load phase limit is exceeded
    /// - whatever `read_snapshot` reports (`Io`, `Serialization`,
    ///   `InvalidSnapshot`)
    pub async fn load_snapshot(&self, path: &Path) -> Result<Snapshot, ExError> {
        log_op_start!("load_snapshot", path = %path.display());
        let start = std::time::Instant::now();

        let owned: PathBuf = path.to_path_buf();
        let task = tokio::task::spawn_blocking(move || read_snapshot(&owned));
        let result = match tokio::time::timeout(self.timeouts.load, task).await {
            Err(_) => Err(ExError::new(ExErrorKind::Timeout)
                .with_op("load_snapshot")
                .with_message(format!(
                    "Loading {} exceeded {}s",
                    path.display(),
                    self.timeouts.load.as_secs()
                ))),
            Ok(Err(join)) => Err(ExError::new(ExErrorKind::Internal)
                .with_op("load_snapshot")
                .with_message(format!("Snapshot loader stopped: {}", join))),
            Ok(Ok(loaded)) => loaded,
        };

        match result {
            Ok(snapshot) => {
                log_op_end!(
                    "load_snapshot",
                    duration_ms = start.elapsed().as_millis() as u64,
                    entry_count = snapshot.entries.len() as u64
                );
                Ok(snapshot)
            }
            Err(err) => {
                let err = err.with_run_id(self.context.run_id.clone());
                log_op_error!(
                    "load_snapshot",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(err)
            }
        }
    }

    /// Compare two environments
    ///
    /// # Errors
    ///
    /// - `InvalidSnapshot` when either snapshot fails validation
    /// - `InvalidInput` when the snapshots are identical
    pub fn compare(&self, source: &Snapshot, target: &Snapshot) -> Result<Comparison, ExError> {
        validate_snapshot(source).map_err(|e| ExError::from(e).with_op("compare"))?;
        validate_snapshot(target).map_err(|e| ExError::from(e).with_op("compare"))?;
        if source == target {
            return Err(ExError::from(SyncError::IdenticalSnapshots)
                .with_op("compare")
                .with_run_id(self.context.run_id.clone()));
        }
        Ok(compare(source, target))
    }

    /// Narrow `snapshot` to `selection` and its dependencies
    ///
    /// # Errors
    ///
    /// - `EmptySelection` when no entries or content types are selected
    /// - `InvalidInput` when a selected locale occurs nowhere in the snapshot
    /// - `InvalidSnapshot` when the snapshot fails validation
    pub fn resolve_selection(
        &self,
        selection: &Selection,
        snapshot: Snapshot,
    ) -> Result<Snapshot, ExError> {
        if !selection.selects_records() {
            return Err(ExError::from(SyncError::EmptySelection).with_op("resolve_selection"));
        }
        validate_snapshot(&snapshot)
            .map_err(|e| ExError::from(e).with_op("resolve_selection"))?;

        let known = discover_locales(&snapshot);
        if let Some(code) = selection.locale_codes.iter().find(|c| !known.contains(*c)) {
            return Err(
                ExError::from(SyncError::UnknownLocale { code: code.clone() })
                    .with_op("resolve_selection"),
            );
        }

        Ok(filter(snapshot, selection))
    }

    /// Replay `snapshot` onto the target
    ///
    /// Locales are remapped when the target's default differs from the
    /// snapshot's; content types are reconciled first, then assets, then
    /// entries with referenced entries ahead of the entries linking to them.
    ///
    /// # Errors
    ///
    /// Only setup failures: an invalid or empty snapshot, or a target whose
    /// locales or content types cannot be listed. Everything after that is
    /// reported in the returned [`MigrationReport`].
    pub async fn apply(
        &self,
        snapshot: Snapshot,
        client: &dyn TargetClient,
    ) -> Result<MigrationReport, ExError> {
        let run_id = self.context.run_id.clone();
        log_op_start!(
            "apply",
            run_id = %run_id,
            target = self.context.target_environment.as_deref().unwrap_or(""),
            entry_count = snapshot.entries.len() as u64,
            asset_count = snapshot.assets.len() as u64
        );
        let start = std::time::Instant::now();

        let mut report = MigrationReport::new(&run_id);
        let prepared = match self.prepare(snapshot, client, &mut report).await {
            Ok(prepared) => prepared,
            Err(err) => {
                let err = err.with_run_id(run_id);
                log_op_error!(
                    "apply",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                return Err(err);
            }
        };

        if let Some((snapshot, blocked)) = prepared {
            let deadline = Instant::now() + self.timeouts.apply;
            self.replicate_all(&snapshot.assets, |_| false, client, deadline, &mut report)
                .await;
            let ordered: Vec<Entry> = publish_order(&snapshot.entries)
                .into_iter()
                .cloned()
                .collect();
            self.replicate_all(
                &ordered,
                |entry| blocked.contains(&entry.content_type_id),
                client,
                deadline,
                &mut report,
            )
            .await;
        }

        let report = report.finish();
        log_op_end!(
            "apply",
            duration_ms = start.elapsed().as_millis() as u64,
            created = report.created,
            updated = report.updated,
            published = report.published,
            skipped = report.skipped,
            failed = report.failed.len() as u64,
            timed_out = report.timed_out
        );
        Ok(report)
    }

    /// Validate, remap and run the preflight
    ///
    /// `Ok(None)` means the preflight ran out of time and every record was
    /// counted as skipped.
    async fn prepare(
        &self,
        snapshot: Snapshot,
        client: &dyn TargetClient,
        report: &mut MigrationReport,
    ) -> Result<Option<(Snapshot, HashSet<String>)>, ExError> {
        validate_snapshot(&snapshot).map_err(|e| ExError::from(e).with_op("apply"))?;
        if snapshot.is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("apply")
                .with_message("Snapshot has nothing to apply"));
        }
        let source_default = default_locale(&snapshot)
            .map_err(|e| ExError::from(e).with_op("apply"))?
            .code
            .clone();

        let retry = &self.retry;
        let locales = tokio::time::timeout(
            self.timeouts.preflight,
            with_retry(retry, "list_locales", move || client.list_locales()),
        )
        .await
        .map_err(|_| self.preflight_timeout("list_locales"))??;
        let target_default = target_default_locale(&locales)?;

        let snapshot = if source_default == target_default {
            snapshot
        } else {
            tracing::info!(
                op = "apply",
                from = %source_default,
                to = %target_default,
                "target default locale differs; remapping"
            );
            report.remapped_locale = Some(LocaleRemap {
                from: source_default.clone(),
                to: target_default.clone(),
            });
            remap(&snapshot, &source_default, &target_default)
        };

        let preflight = match tokio::time::timeout(
            self.timeouts.preflight,
            run_preflight(&snapshot, client, retry),
        )
        .await
        {
            Ok(outcome) => outcome?,
            Err(_) => {
                tracing::warn!(
                    op = "apply",
                    timeout_secs = self.timeouts.preflight.as_secs(),
                    "content-type preflight timed out; no records written"
                );
                report.timed_out = true;
                report.skip((snapshot.assets.len() + snapshot.entries.len()) as u64);
                return Ok(None);
            }
        };

        report.content_types = preflight.actions;
        report.failed.extend(preflight.failures);
        Ok(Some((snapshot, preflight.blocked.into_iter().collect())))
    }

    async fn replicate_all<R, F>(
        &self,
        records: &[R],
        blocked: F,
        client: &dyn TargetClient,
        deadline: Instant,
        report: &mut MigrationReport,
    ) where
        R: Replicable,
        F: Fn(&R) -> bool,
    {
        for (index, record) in records.iter().enumerate() {
            if report.timed_out || Instant::now() >= deadline {
                let remaining = (records.len() - index) as u64;
                if !report.timed_out {
                    tracing::warn!(
                        op = "apply",
                        remaining = remaining,
                        "apply deadline reached; remaining records skipped"
                    );
                }
                report.timed_out = true;
                report.skip(remaining);
                return;
            }
            if blocked(record) {
                tracing::debug!(
                    op = "apply",
                    record_id = record.id(),
                    "content type blocked; record skipped"
                );
                report.skip(1);
                continue;
            }

            match tokio::time::timeout_at(deadline, replicate(record, client, &self.retry)).await
            {
                Ok(Ok(action)) => report.record(action),
                Ok(Err(err)) => {
                    let err = err.with_run_id(self.context.run_id.clone());
                    report.record_failure(FailedRecord::new(record.id(), R::KIND, &err));
                }
                Err(_) => {
                    let err = ExError::new(ExErrorKind::Timeout)
                        .with_op("apply")
                        .with_entity_id(record.id())
                        .with_message("Apply deadline reached while writing this record");
                    report.record_failure(FailedRecord::new(record.id(), R::KIND, &err));
                    report.timed_out = true;
                }
            }
        }
    }

    fn preflight_timeout(&self, op: &str) -> ExError {
        ExError::new(ExErrorKind::Timeout)
            .with_op(op)
            .with_message(format!(
                "Target did not answer within {}s",
                self.timeouts.preflight.as_secs()
            ))
    }
}

fn target_default_locale(locales: &[Locale]) -> Result<String, ExError> {
    let defaults: Vec<&Locale> = locales.iter().filter(|l| l.default).collect();
    match defaults.as_slice() {
        [only] => Ok(only.code.clone()),
        _ => Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("list_locales")
            .with_message(format!(
                "Target must have exactly one default locale, found {}",
                defaults.len()
            ))),
    }
}

/// Entries ordered so that linked entries precede the entries linking to
/// them; cycles are broken at the first entry reached. Otherwise keeps
/// snapshot order.
pub fn publish_order(entries: &[Entry]) -> Vec<&Entry> {
    let by_id: HashMap<&str, &Entry> = entries.iter().map(|e| (e.id.as_str(), e)).collect();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut ordered = Vec::with_capacity(entries.len());

    for root in entries {
        if visited.contains(root.id.as_str()) {
            continue;
        }
        visited.insert(root.id.as_str());
        // (entry, its linked ids, next link to look at)
        let mut stack: Vec<(&Entry, Vec<String>, usize)> = vec![(root, linked_entries(root), 0)];
        while let Some((entry, links, next)) = stack.last_mut() {
            if let Some(id) = links.get(*next) {
                *next += 1;
                if let Some(&child) = by_id.get(id.as_str()) {
                    if visited.insert(child.id.as_str()) {
                        let child_links = linked_entries(child);
                        stack.push((child, child_links, 0));
                    }
                }
            } else {
                ordered.push(*entry);
                stack.pop();
            }
        }
    }
    ordered
}

fn linked_entries(entry: &Entry) -> Vec<String> {
    walk_fields(&entry.fields)
        .into_iter()
        .filter(|r| r.kind == LinkType::Entry)
        .map(|r| r.id)
        .collect()
}
