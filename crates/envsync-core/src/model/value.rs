//! Field value tree.
//!
//! Exported field values are arbitrary JSON. They are lifted into a tagged
//! union once, at deserialization time, so the reference walker and the diff
//! engine pattern-match on variants instead of probing object shapes.
//! Conversion is lossless in both directions: anything that is not a link
//! or a rich-text node stays a plain `Object`/`Scalar`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Values for one field, keyed by locale code
pub type LocaleValues = BTreeMap<String, FieldValue>;

/// All fields of a record: field name -> locale code -> value
pub type LocalizedFields = BTreeMap<String, LocaleValues>;

/// Kind of record a link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LinkType {
    Entry,
    Asset,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Entry => "Entry",
            LinkType::Asset => "Asset",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "Entry" => Some(LinkType::Entry),
            "Asset" => Some(LinkType::Asset),
            _ => None,
        }
    }
}

/// Typed pointer to another entry or asset
///
/// Wire shape: `{"sys": {"type": "Link", "linkType": "Entry", "id": "..."}}`.
/// Any other `sys` keys (`version`, `urn`, ...) are carried in `sys_extra`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub link_type: LinkType,
    pub id: String,
    pub sys_extra: Map<String, Value>,
}

impl Link {
    pub fn entry(id: impl Into<String>) -> Self {
        Self::new(LinkType::Entry, id)
    }

    pub fn asset(id: impl Into<String>) -> Self {
        Self::new(LinkType::Asset, id)
    }

    fn new(link_type: LinkType, id: impl Into<String>) -> Self {
        Self {
            link_type,
            id: id.into(),
            sys_extra: Map::new(),
        }
    }

    /// Recognise a link by its `sys.type`, `sys.linkType` and `sys.id`
    fn from_object(obj: &Map<String, Value>) -> Option<Self> {
        if obj.len() != 1 {
            return None;
        }
        let sys = obj.get("sys")?.as_object()?;
        if sys.get("type")?.as_str()? != "Link" {
            return None;
        }
        let link_type = LinkType::parse(sys.get("linkType")?.as_str()?)?;
        let id = sys.get("id")?.as_str()?.to_string();
        let sys_extra = sys
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "type" | "linkType" | "id"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Some(Self {
            link_type,
            id,
            sys_extra,
        })
    }

    fn to_value(&self) -> Value {
        let mut sys = self.sys_extra.clone();
        sys.insert("type".to_string(), Value::from("Link"));
        sys.insert("linkType".to_string(), Value::from(self.link_type.as_str()));
        sys.insert("id".to_string(), Value::from(self.id.clone()));
        serde_json::json!({ "sys": sys })
    }
}

/// One node of a rich-text document tree
///
/// `data` and `content` are `None` when the source JSON omitted the key;
/// remaining keys (`value`, `marks`, ...) are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq)]
pub struct RichTextNode {
    pub node_type: String,
    pub data: Option<BTreeMap<String, FieldValue>>,
    pub content: Option<Vec<FieldValue>>,
    pub extra: Map<String, Value>,
}

impl RichTextNode {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            data: None,
            content: None,
            extra: Map::new(),
        }
    }

    fn from_object(obj: Map<String, Value>) -> Result<Self, Map<String, Value>> {
        let node_type = match obj.get("nodeType").and_then(Value::as_str) {
            Some(t) => t.to_string(),
            None => return Err(obj),
        };

        let mut node = RichTextNode::new(node_type);
        for (key, value) in obj {
            match (key.as_str(), value) {
                ("nodeType", _) => {}
                ("data", Value::Object(map)) => {
                    node.data = Some(
                        map.into_iter()
                            .map(|(k, v)| (k, FieldValue::from(v)))
                            .collect(),
                    );
                }
                ("content", Value::Array(items)) => {
                    node.content = Some(items.into_iter().map(FieldValue::from).collect());
                }
                (_, value) => {
                    node.extra.insert(key, value);
                }
            }
        }
        Ok(node)
    }

    fn into_value(self) -> Value {
        let mut obj = self.extra;
        obj.insert("nodeType".to_string(), Value::String(self.node_type));
        if let Some(data) = self.data {
            obj.insert(
                "data".to_string(),
                Value::Object(data.into_iter().map(|(k, v)| (k, v.into())).collect()),
            );
        }
        if let Some(content) = self.content {
            obj.insert(
                "content".to_string(),
                Value::Array(content.into_iter().map(Value::from).collect()),
            );
        }
        Value::Object(obj)
    }
}

/// A single (already locale-resolved) field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum FieldValue {
    /// String, number, boolean or null
    Scalar(Value),
    Link(Link),
    RichText(RichTextNode),
    List(Vec<FieldValue>),
    /// Plain JSON object (location, JSON fields, ...)
    Object(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn string(s: impl Into<String>) -> Self {
        FieldValue::Scalar(Value::String(s.into()))
    }

    /// String content if this is a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => FieldValue::List(items.into_iter().map(FieldValue::from).collect()),
            Value::Object(obj) => {
                if let Some(link) = Link::from_object(&obj) {
                    return FieldValue::Link(link);
                }
                match RichTextNode::from_object(obj) {
                    Ok(node) => FieldValue::RichText(node),
                    Err(obj) => FieldValue::Object(
                        obj.into_iter()
                            .map(|(k, v)| (k, FieldValue::from(v)))
                            .collect(),
                    ),
                }
            }
            scalar => FieldValue::Scalar(scalar),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::string(s)
    }
}

impl From<Link> for FieldValue {
    fn from(link: Link) -> Self {
        FieldValue::Link(link)
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Scalar(v) => v,
            FieldValue::Link(link) => link.to_value(),
            FieldValue::RichText(node) => node.into_value(),
            FieldValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            FieldValue::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
