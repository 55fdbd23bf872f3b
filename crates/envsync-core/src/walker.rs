//! Reference walker.
//!
//! Enumerates the outgoing entry and asset references of a field tree.
//! Links are leaves, so walking a single value always terminates; cycles
//! between records are the resolver's concern.

use crate::model::{FieldValue, LinkType, LocalizedFields, RichTextNode};

/// Outgoing reference discovered in a field tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub kind: LinkType,
    pub id: String,
}

/// Rich-text node types that embed or hyperlink another record
fn embedded_kind(node_type: &str) -> Option<LinkType> {
    match node_type {
        "embedded-entry-block" | "embedded-entry-inline" | "entry-hyperlink" => {
            Some(LinkType::Entry)
        }
        "embedded-asset-block" | "asset-hyperlink" => Some(LinkType::Asset),
        _ => None,
    }
}

/// References reachable from one value, in document order
pub fn walk(value: &FieldValue) -> Vec<Reference> {
    let mut refs = Vec::new();
    walk_into(value, &mut refs);
    refs
}

/// References reachable from every field and locale of a record
pub fn walk_fields(fields: &LocalizedFields) -> Vec<Reference> {
    let mut refs = Vec::new();
    for values in fields.values() {
        for value in values.values() {
            walk_into(value, &mut refs);
        }
    }
    refs
}

fn walk_into(value: &FieldValue, refs: &mut Vec<Reference>) {
    match value {
        FieldValue::Scalar(_) => {}
        FieldValue::Link(link) => refs.push(Reference {
            kind: link.link_type,
            id: link.id.clone(),
        }),
        FieldValue::RichText(node) => walk_node(node, refs),
        FieldValue::List(items) => {
            for item in items {
                walk_into(item, refs);
            }
        }
        FieldValue::Object(map) => {
            for item in map.values() {
                walk_into(item, refs);
            }
        }
    }
}

fn walk_node(node: &RichTextNode, refs: &mut Vec<Reference>) {
    match embedded_kind(&node.node_type) {
        Some(kind) => {
            // The tag decides the kind; the target's own sys fields are not walked
            if let Some(FieldValue::Link(link)) = node.data.as_ref().and_then(|d| d.get("target")) {
                refs.push(Reference {
                    kind,
                    id: link.id.clone(),
                });
            }
        }
        None => {
            if let Some(data) = &node.data {
                for item in data.values() {
                    walk_into(item, refs);
                }
            }
        }
    }

    if let Some(content) = &node.content {
        for child in content {
            walk_into(child, refs);
        }
    }
}
