//! HTTP adapter for a management-API style content store
//!
//! Resources live under `{base_url}/spaces/{space}/environments/{env}`.
//! Writes carry `X-Contentful-Version` for optimistic concurrency; entry
//! creation names the content type in `X-Contentful-Content-Type`.
//! Status codes map onto `ExErrorKind`: 429 -> `RateLimited` (with the
//! reset header as `retry_after`), 409 -> `VersionMismatch`, 422 ->
//! `StructuralConflict` carrying the store's message verbatim.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use envsync_core::errors::{ExError, ExErrorKind};
use envsync_core::model::{Asset, ContentType, Entry, Field, Locale, LocalizedFields};
use envsync_core_types::{RequestId, Sensitive};

use crate::client::{ClientResult, TargetClient};

const CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";
const VERSION_HEADER: &str = "X-Contentful-Version";
const CONTENT_TYPE_HEADER: &str = "X-Contentful-Content-Type";
const RATE_LIMIT_RESET_HEADER: &str = "X-Contentful-RateLimit-Reset";
const PAGE_SIZE: usize = 100;

/// Target client speaking the store's management REST API
#[derive(Debug, Clone)]
pub struct HttpTargetClient {
    client: Client,
    base_url: String,
    space_id: String,
    environment_id: String,
    token: Sensitive<String>,
}

impl HttpTargetClient {
    pub fn new(
        base_url: impl Into<String>,
        space_id: impl Into<String>,
        environment_id: impl Into<String>,
        token: Sensitive<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            space_id: space_id.into(),
            environment_id: environment_id.into(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/spaces/{}/environments/{}/{}",
            self.base_url, self.space_id, self.environment_id, path
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(self.token.expose())
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
    }

    /// Send, map error statuses, and hand back the successful response
    async fn send(
        &self,
        op: &str,
        id: Option<&str>,
        request: RequestBuilder,
    ) -> ClientResult<Response> {
        let request_id = RequestId::new();
        tracing::debug!(op = op, request_id = %request_id, entity_id = id.unwrap_or(""), "request");

        let response = request.send().await.map_err(|e| {
            let err = ExError::new(ExErrorKind::ExternalService)
                .with_op(op)
                .with_message(format!("Request failed: {}", e));
            match id {
                Some(id) => err.with_entity_id(id),
                None => err,
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = retry_after(&response);
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(body);

        let kind = match status {
            StatusCode::TOO_MANY_REQUESTS => ExErrorKind::RateLimited,
            StatusCode::NOT_FOUND => ExErrorKind::NotFound,
            StatusCode::CONFLICT => ExErrorKind::VersionMismatch,
            StatusCode::UNPROCESSABLE_ENTITY => ExErrorKind::StructuralConflict,
            StatusCode::UNAUTHORIZED => ExErrorKind::Unauthorised,
            StatusCode::FORBIDDEN => ExErrorKind::Forbidden,
            _ => ExErrorKind::ExternalService,
        };
        let mut err = ExError::new(kind)
            .with_op(op)
            .with_message(format!("{} ({})", message, status.as_u16()));
        if let Some(id) = id {
            err = err.with_entity_id(id);
        }
        if let (ExErrorKind::RateLimited, Some(delay)) = (kind, retry_after) {
            err = err.with_retry_after(delay);
        }
        Err(err)
    }

    async fn json<T: DeserializeOwned>(op: &str, response: Response) -> ClientResult<T> {
        response.json::<T>().await.map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op(op)
                .with_message(format!("Unexpected response body: {}", e))
        })
    }

    /// GET a single resource; 404 is `None`
    async fn get_optional<T: DeserializeOwned>(
        &self,
        op: &str,
        path: &str,
        id: &str,
    ) -> ClientResult<Option<T>> {
        match self.send(op, Some(id), self.request(Method::GET, path)).await {
            Ok(response) => Self::json(op, response).await.map(Some),
            Err(err) if err.kind() == ExErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// GET every page of a collection
    async fn get_all<T: DeserializeOwned>(&self, op: &str, path: &str) -> ClientResult<Vec<T>> {
        let mut items = Vec::new();
        loop {
            let request = self
                .request(Method::GET, path)
                .query(&[("skip", items.len()), ("limit", PAGE_SIZE)]);
            let page: Collection<T> = Self::json(op, self.send(op, None, request).await?).await?;
            let fetched = page.items.len();
            items.extend(page.items);
            if fetched == 0 || items.len() as u64 >= page.total {
                return Ok(items);
            }
        }
    }

    async fn put_record(
        &self,
        op: &str,
        path: &str,
        id: &str,
        version: Option<u64>,
        content_type_id: Option<&str>,
        fields: Option<&LocalizedFields>,
    ) -> ClientResult<RemoteRecord> {
        let mut request = self.request(Method::PUT, path);
        if let Some(version) = version {
            request = request.header(VERSION_HEADER, version.to_string());
        }
        if let Some(ct) = content_type_id {
            request = request.header(CONTENT_TYPE_HEADER, ct);
        }
        if let Some(fields) = fields {
            request = request.json(&FieldsBody { fields });
        }
        Self::json(op, self.send(op, Some(id), request).await?).await
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    let headers = response.headers();
    headers
        .get(RATE_LIMIT_RESET_HEADER)
        .or_else(|| headers.get(reqwest::header::RETRY_AFTER))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default)]
    total: u64,
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SysLink {
    sys: LinkSys,
}

#[derive(Debug, Deserialize)]
struct LinkSys {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordSys {
    id: String,
    version: u64,
    #[serde(default)]
    published_version: Option<u64>,
    #[serde(default)]
    content_type: Option<SysLink>,
}

#[derive(Debug, Deserialize)]
struct RemoteRecord {
    sys: RecordSys,
    #[serde(default)]
    fields: LocalizedFields,
}

impl RemoteRecord {
    fn into_entry(self) -> ClientResult<Entry> {
        let content_type_id = self.sys.content_type.map(|l| l.sys.id).ok_or_else(|| {
            ExError::new(ExErrorKind::Serialization)
                .with_entity_id(self.sys.id.clone())
                .with_message("Entry response lacks sys.contentType")
        })?;
        Ok(Entry {
            id: self.sys.id,
            content_type_id,
            version: self.sys.version,
            published_version: self.sys.published_version,
            fields: self.fields,
        })
    }

    fn into_asset(self) -> Asset {
        Asset {
            id: self.sys.id,
            version: self.sys.version,
            published_version: self.sys.published_version,
            fields: self.fields,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteContentType {
    sys: RecordSys,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    display_field: Option<String>,
    #[serde(default)]
    fields: Vec<Field>,
}

impl From<RemoteContentType> for ContentType {
    fn from(remote: RemoteContentType) -> Self {
        ContentType {
            id: remote.sys.id,
            name: remote.name,
            description: remote.description,
            display_field: remote.display_field,
            fields: remote.fields,
            version: remote.sys.version,
        }
    }
}

#[derive(Serialize)]
struct FieldsBody<'a> {
    fields: &'a LocalizedFields,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentTypeBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_field: Option<&'a str>,
    fields: &'a [Field],
}

#[async_trait]
impl TargetClient for HttpTargetClient {
    async fn get_entry(&self, id: &str) -> ClientResult<Option<Entry>> {
        let record: Option<RemoteRecord> = self
            .get_optional("get_entry", &format!("entries/{}", id), id)
            .await?;
        record.map(RemoteRecord::into_entry).transpose()
    }

    async fn create_entry_with_id(
        &self,
        content_type_id: &str,
        id: &str,
        fields: &LocalizedFields,
    ) -> ClientResult<Entry> {
        self.put_record(
            "create_entry",
            &format!("entries/{}", id),
            id,
            None,
            Some(content_type_id),
            Some(fields),
        )
        .await?
        .into_entry()
    }

    async fn update_entry(&self, entry: &Entry, fields: &LocalizedFields) -> ClientResult<Entry> {
        self.put_record(
            "update_entry",
            &format!("entries/{}", entry.id),
            &entry.id,
            Some(entry.version),
            None,
            Some(fields),
        )
        .await?
        .into_entry()
    }

    async fn publish_entry(&self, entry: &Entry) -> ClientResult<Entry> {
        self.put_record(
            "publish_entry",
            &format!("entries/{}/published", entry.id),
            &entry.id,
            Some(entry.version),
            None,
            None,
        )
        .await?
        .into_entry()
    }

    async fn get_asset(&self, id: &str) -> ClientResult<Option<Asset>> {
        let record: Option<RemoteRecord> = self
            .get_optional("get_asset", &format!("assets/{}", id), id)
            .await?;
        Ok(record.map(RemoteRecord::into_asset))
    }

    async fn create_asset_with_id(
        &self,
        id: &str,
        fields: &LocalizedFields,
    ) -> ClientResult<Asset> {
        let record = self
            .put_record("create_asset", &format!("assets/{}", id), id, None, None, Some(fields))
            .await?;
        Ok(record.into_asset())
    }

    async fn update_asset(&self, asset: &Asset, fields: &LocalizedFields) -> ClientResult<Asset> {
        let record = self
            .put_record(
                "update_asset",
                &format!("assets/{}", asset.id),
                &asset.id,
                Some(asset.version),
                None,
                Some(fields),
            )
            .await?;
        Ok(record.into_asset())
    }

    async fn publish_asset(&self, asset: &Asset) -> ClientResult<Asset> {
        let record = self
            .put_record(
                "publish_asset",
                &format!("assets/{}/published", asset.id),
                &asset.id,
                Some(asset.version),
                None,
                None,
            )
            .await?;
        Ok(record.into_asset())
    }

    async fn list_content_types(&self) -> ClientResult<Vec<ContentType>> {
        let remote: Vec<RemoteContentType> =
            self.get_all("list_content_types", "content_types").await?;
        Ok(remote.into_iter().map(ContentType::from).collect())
    }

    async fn upsert_content_type(
        &self,
        content_type: &ContentType,
        current_version: Option<u64>,
    ) -> ClientResult<ContentType> {
        let op = "upsert_content_type";
        let mut request = self
            .request(Method::PUT, &format!("content_types/{}", content_type.id))
            .json(&ContentTypeBody {
                name: &content_type.name,
                description: content_type.description.as_deref(),
                display_field: content_type.display_field.as_deref(),
                fields: &content_type.fields,
            });
        if let Some(version) = current_version {
            request = request.header(VERSION_HEADER, version.to_string());
        }
        let remote: RemoteContentType =
            Self::json(op, self.send(op, Some(&content_type.id), request).await?).await?;
        Ok(remote.into())
    }

    async fn publish_content_type(&self, content_type: &ContentType) -> ClientResult<ContentType> {
        let op = "publish_content_type";
        let request = self
            .request(
                Method::PUT,
                &format!("content_types/{}/published", content_type.id),
            )
            .header(VERSION_HEADER, content_type.version.to_string());
        let remote: RemoteContentType =
            Self::json(op, self.send(op, Some(&content_type.id), request).await?).await?;
        Ok(remote.into())
    }

    async fn list_locales(&self) -> ClientResult<Vec<Locale>> {
        self.get_all("list_locales", "locales").await
    }
}
