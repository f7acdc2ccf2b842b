//! Context-extraction seam.
//!
//! Deriving project/feature/status metadata from freeform text is an
//! external concern; the engine only attaches whatever the enricher
//! returns to the record metadata.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ContextEnricher: Send + Sync {
    async fn enrich(&self, content: &str, title: &str) -> Result<Value>;
}

/// Enricher that attaches nothing. Used when no extraction backend is
/// configured and as the test default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnricher;

#[async_trait]
impl ContextEnricher for NoopEnricher {
    async fn enrich(&self, _content: &str, _title: &str) -> Result<Value> {
        Ok(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_enricher() {
        let value = NoopEnricher.enrich("content", "title").await.unwrap();
        assert!(value.is_null());
    }
}
