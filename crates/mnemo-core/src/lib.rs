//! Shared record types and the error taxonomy for the mnemo workspace.

pub mod error;
pub mod types;

pub use error::MemoryError;
pub use types::{
    CaptureKind, ChunkLimits, ContentStats, MemoryRecord, RecallResult, RecordMetadata,
    SaveOutcome, SavedAs,
};
