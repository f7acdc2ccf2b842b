//! The chunking, linking, and living-document persistence engine.
//!
//! A save request flows validator -> identifier resolver -> existing-record
//! lookup -> chunk planner -> store writes. Retrieval reassembles chunked
//! sessions from any part's id via the shared session marker.

mod chunker;
mod enrich;
mod http_client;
mod identifier;
mod in_memory;
mod recall;
mod save;
mod stats;
mod store_client;
mod validator;

pub use chunker::{ChunkPlan, plan_chunks};
pub use enrich::{ContextEnricher, NoopEnricher};
pub use http_client::HttpStoreClient;
pub use identifier::resolve_conversation_id;
pub use in_memory::InMemoryStore;
pub use recall::recall_memory;
pub use save::{Persister, SaveRequest};
pub use stats::scan_content;
pub use store_client::{ListQuery, NewRecord, RecordPatch, StoreClient};
pub use validator::{MIN_CONTENT_CHARS, SUMMARY_SUSPECT_CHARS, validate_content};
