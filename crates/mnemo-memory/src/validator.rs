use std::sync::LazyLock;

use mnemo_core::MemoryError;
use regex::Regex;

/// Absolute floor: anything shorter is a note, not a transcript.
pub const MIN_CONTENT_CHARS: usize = 100;

/// Below this, content without speaker turns is treated as a summary.
pub const SUMMARY_SUSPECT_CHARS: usize = 500;

static TURN_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(Human|Assistant|User|AI|H|A):").unwrap());

/// Check raw input before any store interaction.
///
/// Pure predicate: rejections carry enough detail for the caller to
/// resubmit correctly without a second round-trip guess.
pub fn validate_content(content: &str) -> Result<(), MemoryError> {
    let length = content.chars().count();

    if length < MIN_CONTENT_CHARS {
        return Err(MemoryError::ContentTooShort {
            length,
            minimum: MIN_CONTENT_CHARS,
        });
    }

    if length <= SUMMARY_SUSPECT_CHARS && !TURN_MARKER_RE.is_match(content) {
        return Err(MemoryError::LooksLikeSummary {
            length,
            floor: SUMMARY_SUSPECT_CHARS,
        });
    }

    Ok(())
}
