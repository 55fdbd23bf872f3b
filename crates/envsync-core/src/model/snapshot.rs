use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::content_type::{ContentType, EditorInterface};
use super::locale::Locale;
use super::record::{Asset, Entry};

/// Point-in-time export of one environment
///
/// Owned by the phase that produced it and moved to the next one; phases
/// that transform a snapshot return a new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub content_types: Vec<ContentType>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub locales: Vec<Locale>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub editor_interfaces: Vec<EditorInterface>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The locale flagged as default, if exactly one is
    pub fn default_locale(&self) -> Option<&Locale> {
        let mut defaults = self.locales.iter().filter(|l| l.default);
        match (defaults.next(), defaults.next()) {
            (Some(locale), None) => Some(locale),
            _ => None,
        }
    }

    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn content_type(&self, id: &str) -> Option<&ContentType> {
        self.content_types.iter().find(|ct| ct.id == id)
    }

    /// Identity-indexed view of the entries
    pub fn entries_by_id(&self) -> HashMap<&str, &Entry> {
        self.entries.iter().map(|e| (e.id.as_str(), e)).collect()
    }

    /// Configured locale codes
    pub fn locale_codes(&self) -> BTreeSet<String> {
        self.locales.iter().map(|l| l.code.clone()).collect()
    }

    /// No records of any kind
    pub fn is_empty(&self) -> bool {
        self.content_types.is_empty() && self.entries.is_empty() && self.assets.is_empty()
    }
}

/// Operator's choice of what to migrate
///
/// An empty `locale_codes` set keeps every locale. An empty
/// `content_type_ids` together with an empty `entry_ids` selects nothing.
/// Picked `entry_ids` take precedence: a selected content type then only
/// contributes its definition, not its other entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default)]
    pub entry_ids: BTreeSet<String>,
    #[serde(default)]
    pub locale_codes: BTreeSet<String>,
    #[serde(default)]
    pub content_type_ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, id: impl Into<String>) -> Self {
        self.entry_ids.insert(id.into());
        self
    }

    pub fn with_content_type(mut self, id: impl Into<String>) -> Self {
        self.content_type_ids.insert(id.into());
        self
    }

    pub fn with_locale(mut self, code: impl Into<String>) -> Self {
        self.locale_codes.insert(code.into());
        self
    }

    /// Whether any records are selected at all
    pub fn selects_records(&self) -> bool {
        !self.entry_ids.is_empty() || !self.content_type_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locale_requires_exactly_one() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.default_locale().is_none());

        snapshot.locales.push(Locale::new("en", "English").as_default());
        snapshot.locales.push(Locale::new("fr", "French"));
        assert_eq!(snapshot.default_locale().map(|l| l.code.as_str()), Some("en"));

        snapshot.locales.push(Locale::new("de", "German").as_default());
        assert!(snapshot.default_locale().is_none());
    }

    #[test]
    fn test_four_key_format_parses() {
        let raw = r#"{"contentTypes": [], "entries": [], "assets": [], "locales": []}"#;
        let snapshot: Snapshot = serde_json::from_str(raw).unwrap();
        assert!(snapshot.is_empty());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("editorInterfaces").is_none());
    }

    #[test]
    fn test_selection_selects_records() {
        assert!(!Selection::new().with_locale("en").selects_records());
        assert!(Selection::new().with_entry("e1").selects_records());
        assert!(Selection::new().with_content_type("post").selects_records());
    }
}
