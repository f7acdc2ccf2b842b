//! Client seam for the remote memory store.
//!
//! The store's search, ranking, and entity extraction are opaque; this
//! subsystem only consumes create/patch/list/fetch.

use anyhow::Result;
use async_trait::async_trait;
use mnemo_core::{MemoryRecord, RecordMetadata};
use serde::{Deserialize, Serialize};

/// Payload for record creation. The store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub content: String,
    pub title: String,
    pub tags: Vec<String>,
    pub conversation_id: Option<String>,
    pub platform: String,
    pub metadata: RecordMetadata,
}

/// Partial field update for an existing record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecordMetadata>,
}

/// Record filter for list calls: living-document lookup uses
/// conversation id + platform; session gathering uses the session marker.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub conversation_id: Option<String>,
    pub platform: Option<String>,
    pub session_id: Option<String>,
}

impl ListQuery {
    pub fn living_document(conversation_id: &str, platform: &str) -> Self {
        Self {
            conversation_id: Some(conversation_id.to_string()),
            platform: Some(platform.to_string()),
            session_id: None,
        }
    }

    pub fn session(session_id: &str) -> Self {
        Self {
            conversation_id: None,
            platform: None,
            session_id: Some(session_id.to_string()),
        }
    }
}

/// Operations the engine needs from the store.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Create a record; returns the store-assigned id.
    async fn create(&self, record: NewRecord) -> Result<String>;
    /// Patch a record by id.
    async fn patch(&self, id: &str, patch: RecordPatch) -> Result<()>;
    /// List records matching the query.
    async fn list(&self, query: &ListQuery) -> Result<Vec<MemoryRecord>>;
    /// Fetch one record by id.
    async fn fetch(&self, id: &str) -> Result<MemoryRecord>;
}
