use serde::{Deserialize, Serialize};

use super::value::{FieldValue, LocalizedFields};

/// Publication state of a record, derived from its version counters
///
/// The store bumps `version` on every save and records `publishedVersion`
/// as the version that was live at publish time, after which the publish
/// itself bumps `version` once more. Hence:
///
/// - no `publishedVersion` -> `Draft`
/// - `version == publishedVersion + 1` -> `Published`
/// - `version > publishedVersion + 1` -> `Changed` (published, with edits)
///
/// This is a heuristic over the counters the store exposes, not the store's
/// internal state machine. Entries saved several times before their first
/// publish, or archived entries, can be misclassified; callers must treat
/// the result as best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SysStatus {
    Draft,
    Changed,
    Published,
}

impl SysStatus {
    pub fn from_versions(version: u64, published_version: Option<u64>) -> Self {
        match published_version {
            None => SysStatus::Draft,
            // version <= p cannot come from the store; read it as published
            Some(p) if version <= p.saturating_add(1) => SysStatus::Published,
            Some(_) => SysStatus::Changed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SysStatus::Draft => "Draft",
            SysStatus::Changed => "Changed",
            SysStatus::Published => "Published",
        }
    }

    /// Whether reproducing this state requires a publish step
    pub fn needs_publish(&self) -> bool {
        !matches!(self, SysStatus::Draft)
    }
}

impl std::fmt::Display for SysStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One localized content record of a given content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Stable identity: the same id denotes the same logical record in
    /// every environment
    pub id: String,
    pub content_type_id: String,
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_version: Option<u64>,
    #[serde(default)]
    pub fields: LocalizedFields,
}

impl Entry {
    pub fn new(id: impl Into<String>, content_type_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_type_id: content_type_id.into(),
            version: 1,
            published_version: None,
            fields: LocalizedFields::new(),
        }
    }

    /// Set the version counters
    pub fn with_versions(mut self, version: u64, published_version: Option<u64>) -> Self {
        self.version = version;
        self.published_version = published_version;
        self
    }

    /// Set one locale value of one field
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        locale: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.fields
            .entry(name.into())
            .or_default()
            .insert(locale.into(), value.into());
        self
    }

    pub fn sys_status(&self) -> SysStatus {
        SysStatus::from_versions(self.version, self.published_version)
    }
}

/// A media record: same shape as an entry, with fixed fields
/// (`title`, `description`, `file`, each per locale) and no content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_version: Option<u64>,
    #[serde(default)]
    pub fields: LocalizedFields,
}

impl Asset {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: 1,
            published_version: None,
            fields: LocalizedFields::new(),
        }
    }

    pub fn with_versions(mut self, version: u64, published_version: Option<u64>) -> Self {
        self.version = version;
        self.published_version = published_version;
        self
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        locale: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.fields
            .entry(name.into())
            .or_default()
            .insert(locale.into(), value.into());
        self
    }

    pub fn sys_status(&self) -> SysStatus {
        SysStatus::from_versions(self.version, self.published_version)
    }
}
