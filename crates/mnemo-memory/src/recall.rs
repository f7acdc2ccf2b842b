//! Read-path reassembly: from any record of a chunked session, rebuild the
//! full ordered part list via the shared session marker.

use anyhow::Result;
use mnemo_core::{CaptureKind, MemoryError, MemoryRecord, RecallResult};
use tracing::debug;

use crate::store_client::{ListQuery, StoreClient};

/// Retrieve a record and, if it belongs to a chunked session, every
/// sibling part in part-number order plus the index's declared total.
///
/// The index record is the session's commit point: parts it does not
/// reference are uncommitted garbage and are never served. A gap in part
/// numbering or a size mismatch is surfaced as an error, not truncated.
pub async fn recall_memory(store: &dyn StoreClient, record_id: &str) -> Result<RecallResult> {
    let record = store.fetch(record_id).await?;

    let Some(session_id) = record.metadata.capture.session_id().map(str::to_string) else {
        return Ok(RecallResult {
            record,
            parts: Vec::new(),
            declared_total_size: None,
        });
    };

    let siblings = store.list(&ListQuery::session(&session_id)).await?;
    debug!(
        session_id = %session_id,
        siblings = siblings.len(),
        "gathering chunked session"
    );

    let mut index: Option<(Vec<String>, u32, u64)> = None;
    let mut parts: Vec<MemoryRecord> = Vec::new();
    for sibling in siblings {
        match &sibling.metadata.capture {
            CaptureKind::ChunkedIndex {
                part_ids,
                part_count,
                total_size,
                ..
            } => index = Some((part_ids.clone(), *part_count, *total_size)),
            CaptureKind::ChunkedPart { .. } => parts.push(sibling),
            CaptureKind::Single => {}
        }
    }

    let Some((part_ids, part_count, total_size)) = index else {
        return Err(MemoryError::UncommittedSession { session_id }.into());
    };

    parts.retain(|part| part_ids.contains(&part.id));
    parts.sort_by_key(|part| part_number(part));

    for (idx, part) in parts.iter().enumerate() {
        let expected = idx as u32 + 1;
        if part_number(part) != expected {
            return Err(MemoryError::MissingPart {
                session_id,
                missing: expected,
                total: part_count,
            }
            .into());
        }
    }
    if parts.len() as u32 != part_count {
        return Err(MemoryError::MissingPart {
            session_id,
            missing: parts.len() as u32 + 1,
            total: part_count,
        }
        .into());
    }

    let actual: u64 = parts
        .iter()
        .map(|part| part.content.chars().count() as u64)
        .sum();
    if actual != total_size {
        return Err(MemoryError::IncompleteSession {
            session_id,
            expected: total_size,
            actual,
        }
        .into());
    }

    Ok(RecallResult {
        record,
        parts,
        declared_total_size: Some(total_size),
    })
}

fn part_number(record: &MemoryRecord) -> u32 {
    match record.metadata.capture {
        CaptureKind::ChunkedPart { part_number, .. } => part_number,
        _ => 0,
    }
}
