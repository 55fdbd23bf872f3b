//! Publication state replicator
//!
//! Reproduces one source record's publication state on the target:
//!
//! | target   | source `Draft` | source `Published` | source `Changed`          |
//! |----------|----------------|--------------------|---------------------------|
//! | absent   | create         | create, publish    | create, publish, update   |
//! | present  | update         | update, publish    | update, publish, update   |
//!
//! The trailing update of a `Changed` record leaves the target with a
//! published version plus pending edits, which is how the store represents
//! that state. Every call goes through the rate-limit retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use envsync_core::errors::ExError;
use envsync_core::model::{Asset, Entry, LocalizedFields, SysStatus};
use envsync_core::{log_op_end, log_op_error, log_op_start};

use crate::client::{ClientResult, TargetClient};
use crate::retry::{with_retry, RetryPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Entry,
    Asset,
    ContentType,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Entry => "Entry",
            RecordKind::Asset => "Asset",
            RecordKind::ContentType => "ContentType",
        }
    }
}

/// One mutating call made against the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplicationStep {
    Create,
    Update,
    Publish,
}

/// What was done to reproduce one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedAction {
    pub record_id: String,
    pub kind: RecordKind,
    pub source_status: SysStatus,
    pub steps: Vec<ReplicationStep>,
    pub target_existed: bool,
}

impl AppliedAction {
    pub fn published(&self) -> bool {
        self.steps.contains(&ReplicationStep::Publish)
    }
}

/// A record the replicator can drive through the target's lifecycle calls
#[async_trait]
pub trait Replicable: Sized + Send + Sync {
    const KIND: RecordKind;

    fn id(&self) -> &str;
    fn fields(&self) -> &LocalizedFields;
    fn status(&self) -> SysStatus;

    async fn fetch(client: &dyn TargetClient, id: &str) -> ClientResult<Option<Self>>;
    async fn create(&self, client: &dyn TargetClient) -> ClientResult<Self>;
    /// Write this record's fields over `current`
    async fn update(&self, current: &Self, client: &dyn TargetClient) -> ClientResult<Self>;
    async fn publish(current: &Self, client: &dyn TargetClient) -> ClientResult<Self>;
}

#[async_trait]
impl Replicable for Entry {
    const KIND: RecordKind = RecordKind::Entry;

    fn id(&self) -> &str {
        &self.id
    }

    fn fields(&self) -> &LocalizedFields {
        &self.fields
    }

    fn status(&self) -> SysStatus {
        self.sys_status()
    }

    async fn fetch(client: &dyn TargetClient, id: &str) -> ClientResult<Option<Self>> {
        client.get_entry(id).await
    }

    async fn create(&self, client: &dyn TargetClient) -> ClientResult<Self> {
        client
            .create_entry_with_id(&self.content_type_id, &self.id, &self.fields)
            .await
    }

    async fn update(&self, current: &Self, client: &dyn TargetClient) -> ClientResult<Self> {
        client.update_entry(current, &self.fields).await
    }

    async fn publish(current: &Self, client: &dyn TargetClient) -> ClientResult<Self> {
        client.publish_entry(current).await
    }
}

#[async_trait]
impl Replicable for Asset {
    const KIND: RecordKind = RecordKind::Asset;

    fn id(&self) -> &str {
        &self.id
    }

    fn fields(&self) -> &LocalizedFields {
        &self.fields
    }

    fn status(&self) -> SysStatus {
        self.sys_status()
    }

    async fn fetch(client: &dyn TargetClient, id: &str) -> ClientResult<Option<Self>> {
        client.get_asset(id).await
    }

    async fn create(&self, client: &dyn TargetClient) -> ClientResult<Self> {
        client.create_asset_with_id(&self.id, &self.fields).await
    }

    async fn update(&self, current: &Self, client: &dyn TargetClient) -> ClientResult<Self> {
        client.update_asset(current, &self.fields).await
    }

    async fn publish(current: &Self, client: &dyn TargetClient) -> ClientResult<Self> {
        client.publish_asset(current).await
    }
}

/// Reproduce `source`'s fields and publication state on the target
///
/// # Errors
///
/// The first failing call's error, tagged with the record id. Calls made
/// before the failure are not rolled back.
pub async fn replicate<R: Replicable>(
    source: &R,
    client: &dyn TargetClient,
    retry: &RetryPolicy,
) -> Result<AppliedAction, ExError> {
    let status = source.status();
    log_op_start!(
        "replicate",
        record_id = source.id(),
        kind = R::KIND.as_str(),
        source_status = status.as_str()
    );
    let start = std::time::Instant::now();

    let result = drive(source, status, client, retry).await;

    match result {
        Ok(action) => {
            log_op_end!(
                "replicate",
                duration_ms = start.elapsed().as_millis() as u64,
                record_id = source.id(),
                steps = action.steps.len() as u64,
                target_existed = action.target_existed
            );
            Ok(action)
        }
        Err(err) => {
            let err = err.with_entity_id(source.id());
            log_op_error!(
                "replicate",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(err)
        }
    }
}

async fn drive<R: Replicable>(
    source: &R,
    status: SysStatus,
    client: &dyn TargetClient,
    retry: &RetryPolicy,
) -> Result<AppliedAction, ExError> {
    let id = source.id();
    let mut steps = Vec::with_capacity(3);

    let existing = with_retry(retry, "fetch", move || R::fetch(client, id)).await?;
    let target_existed = existing.is_some();

    let mut current = match existing {
        None => {
            let created = with_retry(retry, "create", move || source.create(client)).await?;
            steps.push(ReplicationStep::Create);
            created
        }
        Some(target) => {
            let target = &target;
            let updated =
                with_retry(retry, "update", move || source.update(target, client)).await?;
            steps.push(ReplicationStep::Update);
            updated
        }
    };

    if status.needs_publish() {
        let published = {
            let current = &current;
            with_retry(retry, "publish", move || R::publish(current, client)).await?
        };
        steps.push(ReplicationStep::Publish);
        current = published;

        if status == SysStatus::Changed {
            let current = &current;
            with_retry(retry, "update", move || source.update(current, client)).await?;
            steps.push(ReplicationStep::Update);
        }
    }

    Ok(AppliedAction {
        record_id: id.to_string(),
        kind: R::KIND,
        source_status: status,
        steps,
        target_existed,
    })
}
