use std::time::Duration;

use envsync_core::model::{Asset, ContentType, Entry, Field, Link, Locale, Snapshot};
use envsync_engine::adapters::InMemoryTargetClient;
use envsync_engine::{Orchestrator, RetryPolicy};

#[allow(dead_code)]
pub fn locales() -> Vec<Locale> {
    vec![
        Locale::new("en", "English").as_default(),
        Locale::new("fr", "French"),
    ]
}

/// Target store with the snapshot's locales and no content
#[allow(dead_code)]
pub fn empty_target() -> InMemoryTargetClient {
    InMemoryTargetClient::new(locales())
}

/// Retries fast enough for tests
#[allow(dead_code)]
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 4,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

#[allow(dead_code)]
pub fn orchestrator() -> Orchestrator {
    Orchestrator::default().with_retry(fast_retry())
}

/// Small blog export
///
/// - post-1 (Changed) -> author-1, hero img-1
/// - post-2 (Published) -> author-1
/// - author-1 (Published) -> avatar img-2
/// - page-1 (Draft)
#[allow(dead_code)]
pub fn blog() -> Snapshot {
    Snapshot {
        content_types: vec![
            ContentType::new("post", "Post")
                .with_field(Field::new("title", "Symbol"))
                .with_field(Field::new("author", "Link"))
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
                .with_field("hero", "en", Link::asset("img-1")),
            Entry::new("post-2", "post")
                .with_versions(2, Some(1))
                .with_field("title", "en", "Second post")
                .with_field("author", "en", Link::entry("author-1")),
            Entry::new("author-1", "author")
                .with_versions(2, Some(1))
                .with_field("name", "en", "Ada")
                .with_field("avatar", "en", Link::asset("img-2")),
            Entry::new("page-1", "page").with_field("title", "en", "About"),
        ],
        assets: vec![
            Asset::new("img-1")
                .with_versions(2, Some(1))
                .with_field("title", "en", "Hero"),
            Asset::new("img-2").with_field("title", "en", "Avatar"),
        ],
        locales: locales(),
        editor_interfaces: Vec::new(),
    }
}
