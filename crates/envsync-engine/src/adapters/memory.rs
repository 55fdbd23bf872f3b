//! In-memory target store
//!
//! Simulates the store's version counters faithfully enough to check the
//! publication state a migration leaves behind:
//!
//! - create: `version = 1`, unpublished
//! - update: requires the caller's version to match, then `version += 1`
//! - publish: requires a matching version, sets `published_version =
//!   version`, then `version += 1`
//!
//! Every call is appended to a log; failures and rate limits can be
//! injected per call.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use envsync_core::errors::{ExError, ExErrorKind};
use envsync_core::model::{Asset, ContentType, Entry, Locale, LocalizedFields};

use crate::client::{ClientResult, TargetClient};

/// One recorded call, with the id it targeted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientCall {
    GetEntry(String),
    CreateEntry(String),
    UpdateEntry(String),
    PublishEntry(String),
    GetAsset(String),
    CreateAsset(String),
    UpdateAsset(String),
    PublishAsset(String),
    ListContentTypes,
    UpsertContentType(String),
    PublishContentType(String),
    ListLocales,
}

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<String, Entry>,
    assets: BTreeMap<String, Asset>,
    content_types: BTreeMap<String, ContentType>,
    published_content_types: BTreeSet<String>,
    locales: Vec<Locale>,
    calls: Vec<ClientCall>,
    failures: HashMap<ClientCall, ExError>,
    rate_limits: HashMap<ClientCall, u32>,
    latency: Option<Duration>,
}

/// Target store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryTargetClient {
    state: Mutex<State>,
}

impl InMemoryTargetClient {
    /// Empty store with the given locales
    pub fn new(locales: Vec<Locale>) -> Self {
        let client = Self::default();
        client.lock().locales = locales;
        client
    }

    /// Seed an existing entry (counters taken as given)
    pub fn with_entry(self, entry: Entry) -> Self {
        self.lock().entries.insert(entry.id.clone(), entry);
        self
    }

    pub fn with_asset(self, asset: Asset) -> Self {
        self.lock().assets.insert(asset.id.clone(), asset);
        self
    }

    /// Seed an existing, published content type
    pub fn with_content_type(self, content_type: ContentType) -> Self {
        {
            let mut state = self.lock();
            state
                .published_content_types
                .insert(content_type.id.clone());
            state
                .content_types
                .insert(content_type.id.clone(), content_type);
        }
        self
    }

    /// Make every matching call fail with `err`
    pub fn fail_on(&self, call: ClientCall, err: ExError) {
        self.lock().failures.insert(call, err);
    }

    /// Make the next `times` matching calls fail with `RateLimited`
    pub fn rate_limit(&self, call: ClientCall, times: u32) {
        self.lock().rate_limits.insert(call, times);
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        self.lock().calls.clone()
    }

    pub fn entry(&self, id: &str) -> Option<Entry> {
        self.lock().entries.get(id).cloned()
    }

    pub fn asset(&self, id: &str) -> Option<Asset> {
        self.lock().assets.get(id).cloned()
    }

    pub fn content_type(&self, id: &str) -> Option<ContentType> {
        self.lock().content_types.get(id).cloned()
    }

    pub fn is_content_type_published(&self, id: &str) -> bool {
        self.lock().published_content_types.contains(id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Log the call, then apply injected latency, rate limits and failures
    async fn enter(&self, call: ClientCall) -> ClientResult<()> {
        let latency = {
            let mut state = self.lock();
            state.calls.push(call.clone());
            state.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.lock();
        if let Some(remaining) = state.rate_limits.get_mut(&call) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ExError::new(ExErrorKind::RateLimited)
                    .with_message("Too many requests")
                    .with_retry_after(Duration::from_millis(1)));
            }
        }
        match state.failures.get(&call) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn version_mismatch(id: &str, expected: u64, actual: u64) -> ExError {
    ExError::new(ExErrorKind::VersionMismatch)
        .with_entity_id(id)
        .with_message(format!(
            "Version mismatch: sent {}, current {}",
            expected, actual
        ))
}

fn not_found(id: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_entity_id(id)
        .with_message(format!("Resource not found: {}", id))
}

fn already_exists(id: &str) -> ExError {
    ExError::new(ExErrorKind::AlreadyExists)
        .with_entity_id(id)
        .with_message(format!("Resource already exists: {}", id))
}

#[async_trait]
impl TargetClient for InMemoryTargetClient {
    async fn get_entry(&self, id: &str) -> ClientResult<Option<Entry>> {
        self.enter(ClientCall::GetEntry(id.to_string())).await?;
        Ok(self.lock().entries.get(id).cloned())
    }

    async fn create_entry_with_id(
        &self,
        content_type_id: &str,
        id: &str,
        fields: &LocalizedFields,
    ) -> ClientResult<Entry> {
        self.enter(ClientCall::CreateEntry(id.to_string())).await?;
        let mut state = self.lock();
        if state.entries.contains_key(id) {
            return Err(already_exists(id));
        }
        if !state.content_types.contains_key(content_type_id) {
            return Err(ExError::new(ExErrorKind::StructuralConflict)
                .with_entity_id(id)
                .with_message(format!("Unknown content type: {}", content_type_id)));
        }
        let mut entry = Entry::new(id, content_type_id);
        entry.fields = fields.clone();
        state.entries.insert(id.to_string(), entry.clone());
        Ok(entry)
    }

    async fn update_entry(&self, entry: &Entry, fields: &LocalizedFields) -> ClientResult<Entry> {
        self.enter(ClientCall::UpdateEntry(entry.id.clone())).await?;
        let mut state = self.lock();
        let stored = state
            .entries
            .get_mut(&entry.id)
            .ok_or_else(|| not_found(&entry.id))?;
        if stored.version != entry.version {
            return Err(version_mismatch(&entry.id, entry.version, stored.version));
        }
        stored.fields = fields.clone();
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn publish_entry(&self, entry: &Entry) -> ClientResult<Entry> {
        self.enter(ClientCall::PublishEntry(entry.id.clone())).await?;
        let mut state = self.lock();
        let stored = state
            .entries
            .get_mut(&entry.id)
            .ok_or_else(|| not_found(&entry.id))?;
        if stored.version != entry.version {
            return Err(version_mismatch(&entry.id, entry.version, stored.version));
        }
        stored.published_version = Some(stored.version);
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn get_asset(&self, id: &str) -> ClientResult<Option<Asset>> {
        self.enter(ClientCall::GetAsset(id.to_string())).await?;
        Ok(self.lock().assets.get(id).cloned())
    }

    async fn create_asset_with_id(
        &self,
        id: &str,
        fields: &LocalizedFields,
    ) -> ClientResult<Asset> {
        self.enter(ClientCall::CreateAsset(id.to_string())).await?;
        let mut state = self.lock();
        if state.assets.contains_key(id) {
            return Err(already_exists(id));
        }
        let mut asset = Asset::new(id);
        asset.fields = fields.clone();
        state.assets.insert(id.to_string(), asset.clone());
        Ok(asset)
    }

    async fn update_asset(&self, asset: &Asset, fields: &LocalizedFields) -> ClientResult<Asset> {
        self.enter(ClientCall::UpdateAsset(asset.id.clone())).await?;
        let mut state = self.lock();
        let stored = state
            .assets
            .get_mut(&asset.id)
            .ok_or_else(|| not_found(&asset.id))?;
        if stored.version != asset.version {
            return Err(version_mismatch(&asset.id, asset.version, stored.version));
        }
        stored.fields = fields.clone();
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn publish_asset(&self, asset: &Asset) -> ClientResult<Asset> {
        self.enter(ClientCall::PublishAsset(asset.id.clone())).await?;
        let mut state = self.lock();
        let stored = state
            .assets
            .get_mut(&asset.id)
            .ok_or_else(|| not_found(&asset.id))?;
        if stored.version != asset.version {
            return Err(version_mismatch(&asset.id, asset.version, stored.version));
        }
        stored.published_version = Some(stored.version);
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn list_content_types(&self) -> ClientResult<Vec<ContentType>> {
        self.enter(ClientCall::ListContentTypes).await?;
        Ok(self.lock().content_types.values().cloned().collect())
    }

    async fn upsert_content_type(
        &self,
        content_type: &ContentType,
        current_version: Option<u64>,
    ) -> ClientResult<ContentType> {
        self.enter(ClientCall::UpsertContentType(content_type.id.clone()))
            .await?;
        let mut state = self.lock();
        let version = match (state.content_types.get(&content_type.id), current_version) {
            (None, None) => 1,
            (None, Some(_)) => return Err(not_found(&content_type.id)),
            (Some(_), None) => return Err(already_exists(&content_type.id)),
            (Some(stored), Some(sent)) if stored.version != sent => {
                return Err(version_mismatch(&content_type.id, sent, stored.version))
            }
            (Some(stored), Some(_)) => stored.version + 1,
        };
        let stored = ContentType {
            version,
            ..content_type.clone()
        };
        state
            .content_types
            .insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn publish_content_type(&self, content_type: &ContentType) -> ClientResult<ContentType> {
        self.enter(ClientCall::PublishContentType(content_type.id.clone()))
            .await?;
        let mut state = self.lock();
        let stored = state
            .content_types
            .get_mut(&content_type.id)
            .ok_or_else(|| not_found(&content_type.id))?;
        if stored.version != content_type.version {
            return Err(version_mismatch(
                &content_type.id,
                content_type.version,
                stored.version,
            ));
        }
        stored.version += 1;
        let published = stored.clone();
        state.published_content_types.insert(published.id.clone());
        Ok(published)
    }

    async fn list_locales(&self) -> ClientResult<Vec<Locale>> {
        self.enter(ClientCall::ListLocales).await?;
        Ok(self.lock().locales.clone())
    }
}
