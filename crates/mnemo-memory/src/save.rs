//! The save entry point: resolve identity, update the living document if
//! one exists, otherwise create one record or a chunked session.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mnemo_core::{
    CaptureKind, ChunkLimits, RecordMetadata, SaveOutcome, SavedAs,
};
use serde_json::Value;
use tracing::{info, warn};
use ulid::Ulid;

use crate::chunker::{ChunkPlan, plan_chunks};
use crate::enrich::ContextEnricher;
use crate::identifier::resolve_conversation_id;
use crate::stats::scan_content;
use crate::store_client::{ListQuery, NewRecord, RecordPatch, StoreClient};
use crate::validator::validate_content;

/// Chars of content shown in the index record's preview.
const INDEX_PREVIEW_CHARS: usize = 500;

/// One save request from the caller.
#[derive(Debug, Clone, Default)]
pub struct SaveRequest {
    pub content: String,
    pub title: Option<String>,
    pub tags: Vec<String>,
    /// Explicit living-document key; overrides title-derived slugs.
    pub conversation_id: Option<String>,
}

/// Persistence orchestrator. Carries the platform tag and chunking limits
/// so multiple configurations can coexist (nothing global).
#[derive(Debug, Clone)]
pub struct Persister {
    platform: String,
    limits: ChunkLimits,
}

impl Persister {
    pub fn new(platform: impl Into<String>, limits: ChunkLimits) -> Self {
        Self {
            platform: platform.into(),
            limits,
        }
    }

    /// Save a transcript, updating the matching living document when one
    /// exists and creating record(s) otherwise.
    ///
    /// Store calls are issued sequentially so part numbering and the
    /// index's reference list are deterministic.
    pub async fn save(
        &self,
        store: &dyn StoreClient,
        enricher: &dyn ContextEnricher,
        request: SaveRequest,
    ) -> Result<SaveOutcome> {
        validate_content(&request.content)?;

        let now = Utc::now();
        let total_size = request.content.chars().count() as u64;
        let title = effective_title(request.title.as_deref(), now);
        let conversation_id =
            resolve_conversation_id(request.conversation_id.as_deref(), request.title.as_deref());

        // Enrichment is a black box; a failure there never blocks the save.
        let context = match enricher.enrich(&request.content, &title).await {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "context enrichment failed; saving without it");
                Value::Null
            }
        };

        let mut degraded_lookup = false;
        let existing = match &conversation_id {
            Some(id) => match store
                .list(&ListQuery::living_document(id, &self.platform))
                .await
            {
                Ok(records) => records.into_iter().next(),
                Err(error) => {
                    // Favor availability: save as a new record rather than
                    // failing the whole call while the store is degraded.
                    warn!(
                        conversation_id = %id,
                        %error,
                        "living-document lookup failed; saving as a new record"
                    );
                    degraded_lookup = true;
                    None
                }
            },
            None => None,
        };

        if let Some(record) = existing {
            return self
                .update_existing(store, record.id, request, title, conversation_id, context, now)
                .await
                .map(|mut outcome| {
                    outcome.degraded_lookup = degraded_lookup;
                    outcome
                });
        }

        match plan_chunks(&request.content, self.limits) {
            ChunkPlan::Multi(slices) => {
                // No chunked record carries the resolved key (parts and the
                // index use synthetic ones), so the outcome omits it.
                let mut outcome = self
                    .save_chunked(store, &slices, &title, &request.tags, context, now)
                    .await?;
                outcome.degraded_lookup = degraded_lookup;
                return Ok(outcome);
            }
            ChunkPlan::Single(_) => {}
        }

        let metadata = RecordMetadata {
            capture: CaptureKind::Single,
            stats: scan_content(&request.content),
            context,
            saved_at: now,
        };
        let id = store
            .create(NewRecord {
                content: request.content,
                title,
                tags: request.tags,
                conversation_id: conversation_id.clone(),
                platform: self.platform.clone(),
                metadata,
            })
            .await
            .context("failed to create memory record")?;

        info!(record_id = %id, size = total_size, "memory saved");
        Ok(SaveOutcome {
            saved_as: SavedAs::Created,
            record_ids: vec![id],
            conversation_id,
            session_id: None,
            part_count: None,
            total_size,
            degraded_lookup,
        })
    }

    /// Living-document update: rewrite the matched record in place.
    ///
    /// Updates always rewrite as a single record, even above the chunk
    /// threshold; re-chunking would retire the stable record id the
    /// caller addresses.
    #[allow(clippy::too_many_arguments)]
    async fn update_existing(
        &self,
        store: &dyn StoreClient,
        record_id: String,
        request: SaveRequest,
        title: String,
        conversation_id: Option<String>,
        context: Value,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome> {
        let total_size = request.content.chars().count() as u64;
        if total_size as usize > self.limits.threshold_chars {
            warn!(
                record_id = %record_id,
                size = total_size,
                threshold = self.limits.threshold_chars,
                "living-document update exceeds the chunk threshold; rewriting as a single record"
            );
        }

        let metadata = RecordMetadata {
            capture: CaptureKind::Single,
            stats: scan_content(&request.content),
            context,
            saved_at: now,
        };
        store
            .patch(
                &record_id,
                RecordPatch {
                    content: Some(request.content),
                    title: Some(title),
                    tags: Some(request.tags),
                    metadata: Some(metadata),
                },
            )
            .await
            .with_context(|| format!("failed to update memory record '{record_id}'"))?;

        info!(record_id = %record_id, size = total_size, "living document updated");
        Ok(SaveOutcome {
            saved_as: SavedAs::Updated,
            record_ids: vec![record_id],
            conversation_id,
            session_id: None,
            part_count: None,
            total_size,
            degraded_lookup: false,
        })
    }

    /// Chunked create: parts staged as pending, the index record as the
    /// commit point, then a visibility flip.
    async fn save_chunked(
        &self,
        store: &dyn StoreClient,
        slices: &[&str],
        title: &str,
        tags: &[String],
        context: Value,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome> {
        let session_id = Ulid::new().to_string();
        let total_parts = slices.len() as u32;
        let total_size: u64 = slices
            .iter()
            .map(|slice| slice.chars().count() as u64)
            .sum();

        let mut part_ids = Vec::with_capacity(slices.len());
        for (idx, slice) in slices.iter().enumerate() {
            let part_number = idx as u32 + 1;
            let id = store
                .create(NewRecord {
                    content: (*slice).to_string(),
                    title: format!("{title} - Part {part_number}/{total_parts}"),
                    tags: tags.to_vec(),
                    // Synthetic per-part key: a part is never itself a
                    // living-document target.
                    conversation_id: Some(format!("{session_id}-part-{part_number}")),
                    platform: self.platform.clone(),
                    metadata: RecordMetadata {
                        capture: CaptureKind::ChunkedPart {
                            session_id: session_id.clone(),
                            part_number,
                            total_parts,
                            pending: true,
                        },
                        stats: scan_content(slice),
                        context: Value::Null,
                        saved_at: now,
                    },
                })
                .await
                .with_context(|| {
                    format!(
                        "failed to write part {part_number}/{total_parts} of session '{session_id}'; \
                         parts written so far are pending and will not be served"
                    )
                })?;
            part_ids.push(id);
        }

        let index_id = store
            .create(NewRecord {
                content: index_summary(title, slices, total_parts, total_size),
                title: format!("{title} - Index"),
                tags: tags.to_vec(),
                conversation_id: Some(format!("{session_id}-index")),
                platform: self.platform.clone(),
                metadata: RecordMetadata {
                    capture: CaptureKind::ChunkedIndex {
                        session_id: session_id.clone(),
                        part_ids: part_ids.clone(),
                        part_count: total_parts,
                        total_size,
                    },
                    stats: scan_content(&slices.concat()),
                    context,
                    saved_at: now,
                },
            })
            .await
            .with_context(|| {
                format!("failed to write index record for session '{session_id}'")
            })?;

        // The session is committed; flip the parts visible. A failure here
        // is logged but not fatal: the reader trusts the index's part list.
        for (idx, part_id) in part_ids.iter().enumerate() {
            let part_number = idx as u32 + 1;
            let flip = store
                .patch(
                    part_id,
                    RecordPatch {
                        metadata: Some(RecordMetadata {
                            capture: CaptureKind::ChunkedPart {
                                session_id: session_id.clone(),
                                part_number,
                                total_parts,
                                pending: false,
                            },
                            stats: scan_content(slices[idx]),
                            context: Value::Null,
                            saved_at: now,
                        }),
                        ..RecordPatch::default()
                    },
                )
                .await;
            if let Err(error) = flip {
                warn!(part_id = %part_id, %error, "failed to clear pending marker on part");
            }
        }

        info!(
            session_id = %session_id,
            parts = total_parts,
            size = total_size,
            "chunked memory saved"
        );

        let mut record_ids = part_ids;
        record_ids.push(index_id);
        Ok(SaveOutcome {
            saved_as: SavedAs::Created,
            record_ids,
            conversation_id: None,
            session_id: Some(session_id),
            part_count: Some(total_parts),
            total_size,
            degraded_lookup: false,
        })
    }
}

/// Caller title, or an auto-timestamp fallback that never feeds the slug.
fn effective_title(title: Option<&str>, now: DateTime<Utc>) -> String {
    match title.map(str::trim).filter(|title| !title.is_empty()) {
        Some(title) => title.to_string(),
        None => format!("Conversation {}", now.format("%Y-%m-%d %H:%M")),
    }
}

fn index_summary(title: &str, slices: &[&str], total_parts: u32, total_size: u64) -> String {
    let preview: String = slices
        .first()
        .copied()
        .unwrap_or_default()
        .chars()
        .take(INDEX_PREVIEW_CHARS)
        .collect();
    format!(
        "{title}\n\nChunked conversation: {total_parts} part(s), {total_size} chars total. \
         Retrieve any part id to reassemble the full transcript.\n\n{preview}"
    )
}
