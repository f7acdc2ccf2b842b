use anyhow::{Context, Result};
use async_trait::async_trait;
use mnemo_core::{MemoryError, MemoryRecord};
use serde::Deserialize;

use crate::store_client::{ListQuery, NewRecord, RecordPatch, StoreClient};

/// HTTP client for the remote memory store.
#[derive(Debug, Clone)]
pub struct HttpStoreClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct CreateResponse {
    id: String,
}

impl HttpStoreClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let builder = self.client.request(method, &url);
        if self.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.api_key)
        }
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(MemoryError::Store {
            status: status.as_u16(),
            message: format!("{action}: {}", body.trim()),
        }
        .into())
    }
}

#[async_trait]
impl StoreClient for HttpStoreClient {
    async fn create(&self, record: NewRecord) -> Result<String> {
        let response = self
            .request(reqwest::Method::POST, "/memories")
            .json(&record)
            .send()
            .await
            .context("memory store create request failed")?;
        let response = Self::check(response, "create record").await?;
        let created: CreateResponse = response
            .json()
            .await
            .context("failed to parse create response")?;
        Ok(created.id)
    }

    async fn patch(&self, id: &str, patch: RecordPatch) -> Result<()> {
        let response = self
            .request(reqwest::Method::PATCH, &format!("/memories/{id}"))
            .json(&patch)
            .send()
            .await
            .with_context(|| format!("memory store patch request failed for '{id}'"))?;
        Self::check(response, "patch record").await?;
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<MemoryRecord>> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(conversation_id) = &query.conversation_id {
            params.push(("conversation_id", conversation_id));
        }
        if let Some(platform) = &query.platform {
            params.push(("platform", platform));
        }
        if let Some(session_id) = &query.session_id {
            params.push(("session_id", session_id));
        }

        let response = self
            .request(reqwest::Method::GET, "/memories")
            .query(&params)
            .send()
            .await
            .context("memory store list request failed")?;
        let response = Self::check(response, "list records").await?;
        let records: Vec<MemoryRecord> = response
            .json()
            .await
            .context("failed to parse list response")?;
        Ok(records)
    }

    async fn fetch(&self, id: &str) -> Result<MemoryRecord> {
        let response = self
            .request(reqwest::Method::GET, &format!("/memories/{id}"))
            .send()
            .await
            .with_context(|| format!("memory store fetch request failed for '{id}'"))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MemoryError::RecordNotFound(id.to_string()).into());
        }

        let response = Self::check(response, "fetch record").await?;
        let record: MemoryRecord = response
            .json()
            .await
            .context("failed to parse fetch response")?;
        Ok(record)
    }
}
