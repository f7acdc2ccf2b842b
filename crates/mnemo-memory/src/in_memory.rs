use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;
use mnemo_core::{MemoryError, MemoryRecord};

use crate::store_client::{ListQuery, NewRecord, RecordPatch, StoreClient};

/// In-process store used by tests and offline runs.
///
/// Supports fault injection so the partial-failure paths of a chunked save
/// can be exercised without a network.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<MemoryRecord>,
    next_id: u64,
    creates_remaining: Option<u32>,
    lookups_fail: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Allow `n` more creates, then fail every subsequent one.
    pub fn fail_creates_after(&self, n: u32) {
        self.lock().creates_remaining = Some(n);
    }

    /// Make every list call fail, simulating a degraded store.
    pub fn fail_lookups(&self, fail: bool) {
        self.lock().lookups_fail = fail;
    }

    pub fn record_count(&self) -> usize {
        self.lock().records.len()
    }

    pub fn records(&self) -> Vec<MemoryRecord> {
        self.lock().records.clone()
    }
}

fn matches_query(record: &MemoryRecord, query: &ListQuery) -> bool {
    if let Some(conversation_id) = &query.conversation_id
        && record.conversation_id.as_deref() != Some(conversation_id.as_str())
    {
        return false;
    }
    if let Some(platform) = &query.platform
        && record.platform != *platform
    {
        return false;
    }
    if let Some(session_id) = &query.session_id
        && record.metadata.capture.session_id() != Some(session_id.as_str())
    {
        return false;
    }
    true
}

#[async_trait]
impl StoreClient for InMemoryStore {
    async fn create(&self, record: NewRecord) -> Result<String> {
        let mut inner = self.lock();

        if let Some(remaining) = inner.creates_remaining {
            if remaining == 0 {
                bail!("injected create failure");
            }
            inner.creates_remaining = Some(remaining - 1);
        }

        inner.next_id += 1;
        let id = format!("mem-{}", inner.next_id);
        inner.records.push(MemoryRecord {
            id: id.clone(),
            content: record.content,
            title: record.title,
            tags: record.tags,
            conversation_id: record.conversation_id,
            platform: record.platform,
            metadata: record.metadata,
        });
        Ok(id)
    }

    async fn patch(&self, id: &str, patch: RecordPatch) -> Result<()> {
        let mut inner = self.lock();
        let record = inner
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| MemoryError::RecordNotFound(id.to_string()))?;

        if let Some(content) = patch.content {
            record.content = content;
        }
        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(tags) = patch.tags {
            record.tags = tags;
        }
        if let Some(metadata) = patch.metadata {
            record.metadata = metadata;
        }
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<MemoryRecord>> {
        let inner = self.lock();
        if inner.lookups_fail {
            bail!("injected lookup failure");
        }
        Ok(inner
            .records
            .iter()
            .filter(|record| matches_query(record, query))
            .cloned()
            .collect())
    }

    async fn fetch(&self, id: &str) -> Result<MemoryRecord> {
        let inner = self.lock();
        inner
            .records
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| MemoryError::RecordNotFound(id.to_string()).into())
    }
}
