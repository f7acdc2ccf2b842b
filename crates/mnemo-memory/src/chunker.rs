//! Boundary-aware chunk planning for oversized transcripts.
//!
//! Cuts are anchored to structural markers so each part stays readable in
//! isolation, while concatenating the slices in order always reproduces
//! the input exactly.

use mnemo_core::ChunkLimits;

/// Markers searched for within the lookback window, in priority order:
/// structural section headings, then speaker turns, then paragraph breaks.
const SECTION_MARKERS: [&str; 3] = ["\n## ", "\n# ", "\n---"];
const TURN_MARKERS: [&str; 4] = ["\nHuman:", "\nAssistant:", "\nUser:", "\nAI:"];
const PARAGRAPH_MARKER: &str = "\n\n";

#[derive(Debug)]
pub enum ChunkPlan<'a> {
    /// Content fits the per-call ceiling; write one record.
    Single(&'a str),
    /// Ordered slices whose concatenation equals the input.
    Multi(Vec<&'a str>),
}

impl ChunkPlan<'_> {
    pub fn is_single(&self) -> bool {
        matches!(self, ChunkPlan::Single(_))
    }
}

/// Decide single-write vs. multi-part and compute split points.
pub fn plan_chunks<'a>(content: &'a str, limits: ChunkLimits) -> ChunkPlan<'a> {
    if content.chars().count() <= limits.threshold_chars {
        return ChunkPlan::Single(content);
    }

    // Every pass must consume at least one char, whatever the config says.
    let slice_chars = limits.slice_chars.max(1);

    let mut slices = Vec::new();
    let mut rest = content;

    while !rest.is_empty() {
        let tentative = byte_offset_of_char(rest, slice_chars);
        if tentative == rest.len() {
            slices.push(rest);
            break;
        }

        let window_start =
            byte_offset_of_char(rest, slice_chars.saturating_sub(limits.lookback_chars));
        let cut = boundary_cut(rest, window_start, tentative).unwrap_or(tentative);
        let (slice, tail) = rest.split_at(cut);
        slices.push(slice);
        rest = tail;
    }

    ChunkPlan::Multi(slices)
}

/// Scan the lookback window backward for the highest-priority boundary.
///
/// Returns an absolute cut offset into `text`, positioned so the boundary
/// line (or the text after a paragraph break) opens the next slice.
fn boundary_cut(text: &str, window_start: usize, tentative: usize) -> Option<usize> {
    let window = &text[window_start..tentative];

    for markers in [&SECTION_MARKERS[..], &TURN_MARKERS[..]] {
        if let Some(pos) = rightmost_match(window, markers) {
            // Cut after the newline so the marker starts the next slice.
            let cut = window_start + pos + 1;
            if cut > 0 && cut < text.len() {
                return Some(cut);
            }
        }
    }

    if let Some(pos) = window.rfind(PARAGRAPH_MARKER) {
        let cut = window_start + pos + PARAGRAPH_MARKER.len();
        if cut > 0 && cut < text.len() {
            return Some(cut);
        }
    }

    None
}

fn rightmost_match(window: &str, markers: &[&str]) -> Option<usize> {
    markers.iter().filter_map(|marker| window.rfind(marker)).max()
}

/// Byte offset of the `n`th char, or the text length if it has fewer.
fn byte_offset_of_char(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map_or(text.len(), |(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(threshold: usize, slice: usize, lookback: usize) -> ChunkLimits {
        ChunkLimits {
            threshold_chars: threshold,
            slice_chars: slice,
            lookback_chars: lookback,
        }
    }

    fn reassemble(plan: &ChunkPlan<'_>) -> String {
        match plan {
            ChunkPlan::Single(content) => (*content).to_string(),
            ChunkPlan::Multi(slices) => slices.concat(),
        }
    }

    #[test]
    fn test_at_threshold_is_single() {
        let content = "x".repeat(200);
        let plan = plan_chunks(&content, limits(200, 100, 20));
        assert!(plan.is_single());
    }

    #[test]
    fn test_above_threshold_is_multi() {
        let content = "x".repeat(201);
        let plan = plan_chunks(&content, limits(200, 250, 20));
        match plan {
            ChunkPlan::Multi(slices) => assert_eq!(slices.len(), 1),
            ChunkPlan::Single(_) => panic!("threshold+1 must take the chunked path"),
        }
    }

    #[test]
    fn test_round_trip_plain_text() {
        let content = "abcdefghij".repeat(1_000);
        let plan = plan_chunks(&content, limits(1_000, 1_500, 100));
        assert_eq!(reassemble(&plan), content);
    }

    #[test]
    fn test_cut_prefers_section_marker() {
        let mut content = String::new();
        for i in 0..40 {
            content.push_str(&format!("\n## Section {i}\n"));
            content.push_str(&"body text ".repeat(20));
        }
        let plan = plan_chunks(&content, limits(500, 600, 300));
        let ChunkPlan::Multi(slices) = &plan else {
            panic!("expected multi");
        };
        assert!(slices.len() > 1);
        for slice in &slices[1..] {
            assert!(
                slice.starts_with("## Section") || slice.starts_with('\n'),
                "later slices should open at a section boundary, got: {:?}",
                &slice[..slice.len().min(30)]
            );
        }
        assert_eq!(reassemble(&plan), content);
    }

    #[test]
    fn test_cut_falls_back_to_turn_marker() {
        let mut content = String::new();
        for i in 0..60 {
            content.push_str(&format!("\nHuman: question {i}\n"));
            content.push_str(&format!("\nAssistant: answer {i} "));
            content.push_str(&"detail ".repeat(15));
        }
        let plan = plan_chunks(&content, limits(400, 500, 250));
        let ChunkPlan::Multi(slices) = &plan else {
            panic!("expected multi");
        };
        assert!(slices.len() > 1);
        for slice in &slices[1..] {
            assert!(
                slice.starts_with("Human:") || slice.starts_with("Assistant:"),
                "later slices should open at a speaker turn, got: {:?}",
                &slice[..slice.len().min(30)]
            );
        }
        assert_eq!(reassemble(&plan), content);
    }

    #[test]
    fn test_cut_falls_back_to_paragraph_break() {
        let paragraph = format!("{}\n\n", "word ".repeat(30));
        let content = paragraph.repeat(30);
        let plan = plan_chunks(&content, limits(300, 400, 200));
        let ChunkPlan::Multi(slices) = &plan else {
            panic!("expected multi");
        };
        assert!(slices.len() > 1);
        for slice in &slices[..slices.len() - 1] {
            assert!(
                slice.ends_with("\n\n"),
                "paragraph cuts should land after the blank line"
            );
        }
        assert_eq!(reassemble(&plan), content);
    }

    #[test]
    fn test_no_boundary_uses_tentative_cut() {
        let content = "x".repeat(2_500);
        let plan = plan_chunks(&content, limits(1_000, 1_000, 100));
        let ChunkPlan::Multi(slices) = &plan else {
            panic!("expected multi");
        };
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].len(), 1_000);
        assert_eq!(reassemble(&plan), content);
    }

    #[test]
    fn test_multibyte_content_cuts_on_char_boundaries() {
        let content = "äöüßéñ".repeat(600);
        let plan = plan_chunks(&content, limits(1_000, 1_200, 50));
        assert_eq!(reassemble(&plan), content);
    }

    #[test]
    fn test_zero_slice_config_still_terminates() {
        // A hand-edited config can set the slice length to zero; the scan
        // must still advance and reproduce the input.
        let content = "Human: hi\nAssistant: hello\n".repeat(20);
        let plan = plan_chunks(&content, limits(0, 0, 1_000));
        let ChunkPlan::Multi(slices) = &plan else {
            panic!("expected multi");
        };
        assert!(slices.iter().all(|slice| !slice.is_empty()));
        assert_eq!(reassemble(&plan), content);
    }

    #[test]
    fn test_every_slice_nonempty() {
        // A paragraph break sitting at the very start of the lookback
        // window must not produce an empty slice or stall the scan.
        let mut content = "\n\n".to_string();
        content.push_str(&"y".repeat(3_000));
        let plan = plan_chunks(&content, limits(500, 600, 600));
        let ChunkPlan::Multi(slices) = &plan else {
            panic!("expected multi");
        };
        assert!(slices.iter().all(|slice| !slice.is_empty()));
        assert_eq!(reassemble(&plan), content);
    }
}
