//! Client for a PocketBase-style HTTP record store.
//!
//! The entry lives in the `content` field of one record:
//! `{base}/api/collections/{collection}/records/{record_id}`. Updates are a
//! `PATCH` of that record; a 404 on update means the record does not exist
//! yet, so it is created with a `POST` to the collection.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use aramdb_core::StoreConfig;

use crate::entry::CacheEntry;
use crate::error::CacheStoreError;
use crate::CacheStore;

/// Identity and timestamps of a stored record, as returned by list queries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordSummary {
    pub id: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    content: Option<CacheEntry>,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    items: Vec<RecordSummary>,
}

pub struct HttpCacheStore {
    client: Client,
    base_url: Url,
    collection: String,
    record_id: String,
    token: Option<String>,
}

impl HttpCacheStore {
    /// Creates a store client from configuration.
    ///
    /// A missing token is not an error: requests go out unauthenticated and
    /// a warning is logged once here.
    ///
    /// # Errors
    ///
    /// Returns [`CacheStoreError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`CacheStoreError::InvalidBaseUrl`] for an unparsable URL.
    pub fn new(config: &StoreConfig, timeout_secs: u64) -> Result<Self, CacheStoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("aramdb/0.1 (cache-store)")
            .build()?;

        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            CacheStoreError::InvalidBaseUrl(format!("'{}': {e}", config.base_url))
        })?;

        if config.token.is_none() {
            tracing::warn!(
                base_url = %base_url,
                "no store token configured; store requests are unauthenticated"
            );
        }

        Ok(Self {
            client,
            base_url,
            collection: config.collection.clone(),
            record_id: config.record_id.clone(),
            token: config.token.clone(),
        })
    }

    /// Lists the records of the configured collection.
    ///
    /// # Errors
    ///
    /// Returns [`CacheStoreError`] on network failure, non-2xx status or an
    /// unexpected body.
    pub async fn list_records(&self) -> Result<Vec<RecordSummary>, CacheStoreError> {
        let url = self.collection_url()?;
        let response = self.authorized(self.client.get(url.clone())).send().await?;
        let response = ensure_success(response, &url).await?;
        let text = response.text().await?;
        let envelope: ListEnvelope =
            serde_json::from_str(&text).map_err(|source| CacheStoreError::Json {
                context: format!("list {}", self.collection),
                source,
            })?;
        Ok(envelope.items)
    }

    fn collection_url(&self) -> Result<Url, CacheStoreError> {
        self.join(&format!("api/collections/{}/records", self.collection))
    }

    fn record_url(&self) -> Result<Url, CacheStoreError> {
        self.join(&format!(
            "api/collections/{}/records/{}",
            self.collection, self.record_id
        ))
    }

    fn join(&self, path: &str) -> Result<Url, CacheStoreError> {
        self.base_url
            .join(path)
            .map_err(|e| CacheStoreError::InvalidBaseUrl(format!("cannot join '{path}': {e}")))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn create(&self, entry: &CacheEntry) -> Result<(), CacheStoreError> {
        let url = self.collection_url()?;
        let body = json!({ "id": self.record_id, "content": entry });
        let response = self
            .authorized(self.client.post(url.clone()))
            .json(&body)
            .send()
            .await?;
        ensure_success(response, &url).await?;
        tracing::info!(record_id = %self.record_id, "created cache record");
        Ok(())
    }
}

#[async_trait]
impl CacheStore for HttpCacheStore {
    fn describe(&self) -> String {
        format!(
            "{}api/collections/{}/records/{}",
            self.base_url, self.collection, self.record_id
        )
    }

    async fn load(&self) -> Result<Option<CacheEntry>, CacheStoreError> {
        let url = self.record_url()?;
        let response = self.authorized(self.client.get(url.clone())).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response, &url).await?;
        let text = response.text().await?;
        let envelope: RecordEnvelope =
            serde_json::from_str(&text).map_err(|source| CacheStoreError::Json {
                context: format!("record {}", self.record_id),
                source,
            })?;
        Ok(envelope.content)
    }

    async fn save(&self, entry: &CacheEntry) -> Result<(), CacheStoreError> {
        let url = self.record_url()?;
        let body = json!({ "content": entry });
        let response = self
            .authorized(self.client.patch(url.clone()))
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(record_id = %self.record_id, "cache record missing; creating");
            return self.create(entry).await;
        }
        ensure_success(response, &url).await?;
        tracing::debug!(record_id = %self.record_id, "updated cache record");
        Ok(())
    }

    async fn health(&self) -> Result<(), CacheStoreError> {
        let url = self.join("api/health")?;
        let response = self.client.get(url.clone()).send().await?;
        ensure_success(response, &url).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response, url: &Url) -> Result<Response, CacheStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CacheStoreError::UnexpectedStatus {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    })
}
