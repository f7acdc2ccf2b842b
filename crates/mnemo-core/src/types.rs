use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One durable record in the remote memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Store-assigned opaque identifier.
    pub id: String,
    pub content: String,
    pub title: String,
    pub tags: Vec<String>,
    /// Stable lookup key for living-document saves. Distinct from `id`.
    pub conversation_id: Option<String>,
    /// Tag identifying the originating host environment.
    pub platform: String,
    pub metadata: RecordMetadata,
}

/// Closed metadata attached to every record.
///
/// The capture type is a tagged union rather than an open attribute bag so
/// the save/recall branches over it are exhaustive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub capture: CaptureKind,
    #[serde(default)]
    pub stats: ContentStats,
    /// Opaque output of the context-enrichment step.
    #[serde(default)]
    pub context: serde_json::Value,
    pub saved_at: DateTime<Utc>,
}

/// How a record was captured: whole, as one slice of an oversized
/// transcript, or as the index summarizing a chunked session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CaptureKind {
    Single,
    #[serde(rename = "chunked")]
    ChunkedPart {
        session_id: String,
        part_number: u32,
        total_parts: u32,
        /// Set on creation, cleared once the session's index record exists.
        pending: bool,
    },
    ChunkedIndex {
        session_id: String,
        /// Store-assigned ids of every part, in part-number order.
        part_ids: Vec<String>,
        part_count: u32,
        /// Combined char count of all part contents.
        total_size: u64,
    },
}

impl CaptureKind {
    /// Session marker shared by all parts and the index of one chunked save.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            CaptureKind::Single => None,
            CaptureKind::ChunkedPart { session_id, .. }
            | CaptureKind::ChunkedIndex { session_id, .. } => Some(session_id),
        }
    }

    pub fn is_part(&self) -> bool {
        matches!(self, CaptureKind::ChunkedPart { .. })
    }
}

/// Shape statistics computed over the raw transcript.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ContentStats {
    pub turn_count: u32,
    pub code_block_count: u32,
    pub url_count: u32,
    pub file_path_count: u32,
}

/// Chunking constants, externally supplied via configuration.
#[derive(Debug, Clone, Copy)]
pub struct ChunkLimits {
    /// Content at or below this many chars is never split.
    pub threshold_chars: usize,
    /// Tentative slice length in chars.
    pub slice_chars: usize,
    /// How far back from a tentative cut to scan for a boundary.
    pub lookback_chars: usize,
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self {
            threshold_chars: 15_000,
            slice_chars: 20_000,
            lookback_chars: 1_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SavedAs {
    Created,
    Updated,
}

/// What a save wrote, returned to the caller for confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub saved_as: SavedAs,
    /// Store-assigned ids; for a chunked save, part ids in order followed
    /// by the index id.
    pub record_ids: Vec<String>,
    /// Living-document key the written record carries. `None` for chunked
    /// saves: parts and the index use synthetic keys, so later saves with
    /// the same title start a fresh session.
    pub conversation_id: Option<String>,
    pub session_id: Option<String>,
    pub part_count: Option<u32>,
    /// Char count of the saved content.
    pub total_size: u64,
    /// True when the living-document lookup failed and the save fell
    /// through to create-new.
    pub degraded_lookup: bool,
}

/// A retrieved record plus, for chunked sessions, its ordered siblings.
#[derive(Debug, Clone, Serialize)]
pub struct RecallResult {
    pub record: MemoryRecord,
    /// All parts of the session in part-number order; empty for a
    /// single-capture record.
    pub parts: Vec<MemoryRecord>,
    /// Total size declared by the session's index record.
    pub declared_total_size: Option<u64>,
}

impl RecallResult {
    /// Reconstruct the full transcript by concatenating parts in order.
    /// `None` for single-capture records.
    pub fn assembled_content(&self) -> Option<String> {
        if self.parts.is_empty() {
            return None;
        }
        let mut assembled = String::new();
        for part in &self.parts {
            assembled.push_str(&part.content);
        }
        Some(assembled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn metadata(capture: CaptureKind) -> RecordMetadata {
        RecordMetadata {
            capture,
            stats: ContentStats::default(),
            context: serde_json::Value::Null,
            saved_at: Utc::now(),
        }
    }

    fn record(id: &str, content: &str, capture: CaptureKind) -> MemoryRecord {
        MemoryRecord {
            id: id.to_string(),
            content: content.to_string(),
            title: "t".to_string(),
            tags: Vec::new(),
            conversation_id: None,
            platform: "test".to_string(),
            metadata: metadata(capture),
        }
    }

    #[test]
    fn test_capture_kind_wire_names() {
        let single = serde_json::to_value(CaptureKind::Single).unwrap();
        assert_eq!(single["kind"], "single");

        let part = serde_json::to_value(CaptureKind::ChunkedPart {
            session_id: "s".into(),
            part_number: 1,
            total_parts: 2,
            pending: false,
        })
        .unwrap();
        assert_eq!(part["kind"], "chunked");

        let index = serde_json::to_value(CaptureKind::ChunkedIndex {
            session_id: "s".into(),
            part_ids: vec!["a".into()],
            part_count: 1,
            total_size: 10,
        })
        .unwrap();
        assert_eq!(index["kind"], "chunked-index");
    }

    #[test]
    fn test_capture_kind_session_id() {
        assert_eq!(CaptureKind::Single.session_id(), None);
        let part = CaptureKind::ChunkedPart {
            session_id: "s1".into(),
            part_number: 1,
            total_parts: 1,
            pending: true,
        };
        assert_eq!(part.session_id(), Some("s1"));
        assert!(part.is_part());
    }

    #[test]
    fn test_assembled_content_orders_parts() {
        let part = |n: u32, content: &str| {
            record(
                &format!("mem-{n}"),
                content,
                CaptureKind::ChunkedPart {
                    session_id: "s1".into(),
                    part_number: n,
                    total_parts: 2,
                    pending: false,
                },
            )
        };
        let result = RecallResult {
            record: part(1, "hello "),
            parts: vec![part(1, "hello "), part(2, "world")],
            declared_total_size: Some(11),
        };
        assert_eq!(result.assembled_content().as_deref(), Some("hello world"));
    }

    #[test]
    fn test_assembled_content_none_for_single() {
        let result = RecallResult {
            record: record("mem-1", "whole", CaptureKind::Single),
            parts: Vec::new(),
            declared_total_size: None,
        };
        assert!(result.assembled_content().is_none());
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let rec = record(
            "mem-9",
            "content",
            CaptureKind::ChunkedIndex {
                session_id: "s9".into(),
                part_ids: vec!["mem-7".into(), "mem-8".into()],
                part_count: 2,
                total_size: 123,
            },
        );
        let json = serde_json::to_string(&rec).unwrap();
        let back: MemoryRecord = serde_json::from_str(&json).unwrap();
        match back.metadata.capture {
            CaptureKind::ChunkedIndex {
                part_count,
                total_size,
                ..
            } => {
                assert_eq!(part_count, 2);
                assert_eq!(total_size, 123);
            }
            other => panic!("unexpected capture kind: {other:?}"),
        }
    }
}
