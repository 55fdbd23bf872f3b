//! Target store port
//!
//! Everything the engine needs from the store it writes to. Records travel
//! as core model values: `version`/`published_version` on a returned record
//! reflect the store's counters after the call, and the record passed to
//! `update_*`/`publish_*` must carry the version the caller last saw
//! (optimistic concurrency).

use async_trait::async_trait;

use envsync_core::errors::ExError;
use envsync_core::model::{Asset, ContentType, Entry, Locale, LocalizedFields};

/// Result type for client calls
pub type ClientResult<T> = std::result::Result<T, ExError>;

/// Write access to one environment of the target store
///
/// Implementations map throttling to `ExErrorKind::RateLimited` (with
/// `retry_after` when the store says how long to wait) and stale versions
/// to `ExErrorKind::VersionMismatch`.
#[async_trait]
pub trait TargetClient: Send + Sync {
    /// `None` when the entry does not exist
    async fn get_entry(&self, id: &str) -> ClientResult<Option<Entry>>;

    async fn create_entry_with_id(
        &self,
        content_type_id: &str,
        id: &str,
        fields: &LocalizedFields,
    ) -> ClientResult<Entry>;

    /// Replace the fields of `entry`; bumps its version
    async fn update_entry(&self, entry: &Entry, fields: &LocalizedFields) -> ClientResult<Entry>;

    async fn publish_entry(&self, entry: &Entry) -> ClientResult<Entry>;

    async fn get_asset(&self, id: &str) -> ClientResult<Option<Asset>>;

    async fn create_asset_with_id(&self, id: &str, fields: &LocalizedFields)
        -> ClientResult<Asset>;

    async fn update_asset(&self, asset: &Asset, fields: &LocalizedFields) -> ClientResult<Asset>;

    async fn publish_asset(&self, asset: &Asset) -> ClientResult<Asset>;

    async fn list_content_types(&self) -> ClientResult<Vec<ContentType>>;

    /// Create (`current_version = None`) or replace a content type
    async fn upsert_content_type(
        &self,
        content_type: &ContentType,
        current_version: Option<u64>,
    ) -> ClientResult<ContentType>;

    async fn publish_content_type(&self, content_type: &ContentType) -> ClientResult<ContentType>;

    async fn list_locales(&self) -> ClientResult<Vec<Locale>>;
}
