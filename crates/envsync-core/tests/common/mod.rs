use envsync_core::model::{
    Asset, ContentType, Entry, Field, FieldValue, Link, Locale, LocalizedFields, Snapshot,
};
use serde_json::json;

/// English-default locale list with a French secondary
#[allow(dead_code)]
pub fn locales() -> Vec<Locale> {
    vec![
        Locale::new("en", "English").as_default(),
        Locale::new("fr", "French"),
    ]
}

/// Snapshot holding just the given entries and the default locales
#[allow(dead_code)]
pub fn snapshot_of(entries: Vec<Entry>) -> Snapshot {
    Snapshot {
        locales: locales(),
        entries,
        ..Snapshot::default()
    }
}

/// Blog export: posts link authors, authors link avatars, posts embed
/// related posts in rich text
///
/// - post-1 -> author-1 (en), related post-2 (rich text), hero img-1
/// - post-2 -> author-2 (fr only)
/// - author-1 -> avatar img-2
/// - page-1 stands alone; img-3 is unreferenced
#[allow(dead_code)]
pub fn blog() -> Snapshot {
    let body = FieldValue::from(json!({
        "nodeType": "document",
        "data": {},
        "content": [
            {"nodeType": "paragraph", "data": {}, "content": [
                {"nodeType": "text", "value": "See also", "marks": [], "data": {}}
            ]},
            {"nodeType": "embedded-entry-block", "data": {
                "target": {"sys": {"type": "Link", "linkType": "Entry", "id": "post-2"}}
            }, "content": []}
        ]
    }));

    Snapshot {
        content_types: vec![
            ContentType::new("post", "Post")
                .with_field(Field::new("title", "Symbol"))
                .with_field(Field::new("author", "Link"))
                .with_field(Field::new("body", "RichText"))
                .with_field(Field::new("hero", "Link")),
            ContentType::new("author", "Author")
                .with_field(Field::new("name", "Symbol"))
                .with_field(Field::new("avatar", "Link")),
            ContentType::new("page", "Page").with_field(Field::new("title", "Symbol")),
        ],
        entries: vec![
            Entry::new("post-1", "post")
                .with_versions(5, Some(3))
                .with_field("title", "en", "First post")
                .with_field("title", "fr", "Premier article")
                .with_field("author", "en", Link::entry("author-1"))
                .with_field("body", "en", body)
                .with_field("hero", "en", Link::asset("img-1")),
            Entry::new("post-2", "post")
                .with_versions(2, Some(1))
                .with_field("title", "en", "Second post")
                .with_field("author", "fr", Link::entry("author-2")),
            Entry::new("author-1", "author")
                .with_versions(2, Some(1))
                .with_field("name", "en", "Ada")
                .with_field("avatar", "en", Link::asset("img-2")),
            Entry::new("author-2", "author").with_field("name", "en", "Grace"),
            Entry::new("page-1", "page").with_field("title", "en", "About"),
        ],
        assets: vec![
            Asset::new("img-1").with_field("title", "en", "Hero"),
            Asset::new("img-2").with_field("title", "en", "Avatar"),
            Asset::new("img-3").with_field("title", "en", "Unused"),
        ],
        locales: locales(),
        editor_interfaces: Vec::new(),
    }
}

/// Every locale key used anywhere in a field map
#[allow(dead_code)]
pub fn locale_keys(fields: &LocalizedFields) -> Vec<String> {
    let mut keys: Vec<String> = fields
        .values()
        .flat_map(|values| values.keys().cloned())
        .collect();
    keys.sort();
    keys.dedup();
    keys
}
