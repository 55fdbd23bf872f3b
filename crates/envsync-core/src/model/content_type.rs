use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Schema of one kind of entry
///
/// Identity is `id`. Two content types are structurally equal when name,
/// display field and the id-sorted field list (name, type, required,
/// localized) agree; `version` and `description` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub version: u64,
}

/// One field definition of a content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized: Option<bool>,
    /// `Entry` / `Asset` for link fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    /// Item schema for array fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
    /// Per-locale default value, keyed by locale code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omitted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<Vec<Value>>,
}

impl Field {
    /// Minimal field definition (tests and fixtures)
    pub fn new(id: impl Into<String>, field_type: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            field_type: field_type.into(),
            required: None,
            localized: None,
            link_type: None,
            items: None,
            default_value: None,
            omitted: None,
            disabled: None,
            validations: None,
        }
    }

    /// The (name, type, required, localized) tuple that structural equality compares
    fn signature(&self) -> (&str, &str, bool, bool) {
        (
            &self.name,
            &self.field_type,
            self.required.unwrap_or(false),
            self.localized.unwrap_or(false),
        )
    }

    pub fn same_shape(&self, other: &Field) -> bool {
        self.id == other.id && self.signature() == other.signature()
    }
}

impl ContentType {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            display_field: None,
            fields: Vec::new(),
            version: 1,
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Structural equality used by the diff engine and the apply preflight
    pub fn structurally_equal(&self, other: &ContentType) -> bool {
        if self.name != other.name || self.display_field != other.display_field {
            return false;
        }
        if self.fields.len() != other.fields.len() {
            return false;
        }
        let mut mine: Vec<&Field> = self.fields.iter().collect();
        let mut theirs: Vec<&Field> = other.fields.iter().collect();
        mine.sort_by(|a, b| a.id.cmp(&b.id));
        theirs.sort_by(|a, b| a.id.cmp(&b.id));
        mine.iter().zip(theirs.iter()).all(|(a, b)| a.same_shape(b))
    }
}

/// Editor widget configuration for one content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorInterface {
    pub content_type_id: String,
    #[serde(default)]
    pub controls: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> ContentType {
        ContentType::new("post", "Post")
            .with_field(Field::new("title", "Symbol"))
            .with_field(Field::new("body", "RichText"))
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let a = post();
        let mut b = post();
        b.fields.reverse();
        b.version = 7;
        b.description = Some("changed".to_string());
        assert!(a.structurally_equal(&b));
    }

    #[test]
    fn test_required_flag_is_structural() {
        let a = post();
        let mut b = post();
        b.fields[0].required = Some(true);
        assert!(!a.structurally_equal(&b));
    }

    #[test]
    fn test_missing_flags_equal_false() {
        let a = post();
        let mut b = post();
        b.fields[0].localized = Some(false);
        assert!(a.structurally_equal(&b));
    }

    #[test]
    fn test_display_field_is_structural() {
        let a = post();
        let mut b = post();
        b.display_field = Some("title".to_string());
        assert!(!a.structurally_equal(&b));
    }
}
