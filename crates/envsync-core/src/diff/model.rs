//! Diff output types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! JSON keys are camelCase, matching the snapshot format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::{LocalizedFields, SysStatus};

/// Classification of one record across the two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiffStatus {
    /// Present in source only
    New,
    /// Present in both, with at least one field or locale value differing
    Modified,
    /// Present in target only
    Deleted,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffStatus::New => "NEW",
            DiffStatus::Modified => "MODIFIED",
            DiffStatus::Deleted => "DELETED",
        }
    }
}

/// One reported entry difference
///
/// `old_fields` holds the target's fields (MODIFIED, DELETED); `new_fields`
/// holds the source's (NEW, MODIFIED).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffItem {
    pub entry_id: String,
    pub content_type_id: String,
    pub title: String,
    pub status: DiffStatus,
    pub sys_status: SysStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_fields: Option<LocalizedFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_fields: Option<LocalizedFields>,
    /// Field names whose values differ, sorted; empty unless MODIFIED
    #[serde(default)]
    pub changed_fields: Vec<String>,
}

/// One reported content-type difference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeDiffItem {
    pub content_type_id: String,
    pub name: String,
    pub status: DiffStatus,
    /// Field ids present in source only
    #[serde(default)]
    pub added_fields: Vec<String>,
    /// Field ids present in target only
    #[serde(default)]
    pub removed_fields: Vec<String>,
    /// Field ids present in both whose shape differs
    #[serde(default)]
    pub changed_fields: Vec<String>,
}

/// Everything the operator reviews before selecting what to migrate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub entries: Vec<DiffItem>,
    pub content_types: Vec<ContentTypeDiffItem>,
    /// Configured locales of the source unioned with every locale key that
    /// actually occurs in its entry and asset fields
    pub available_locales: BTreeSet<String>,
}

impl Comparison {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.content_types.is_empty()
    }

    /// Number of entry items with the given status
    pub fn count(&self, status: DiffStatus) -> usize {
        self.entries.iter().filter(|d| d.status == status).count()
    }
}
