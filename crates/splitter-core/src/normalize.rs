//! Segment length normalization
//!
//! Oversized spans are cut into pieces of exactly the target duration. A
//! trailing remainder survives only if it reaches the minimum duration.

use crate::buffer::AudioBuffer;

/// Cuts non-silent spans into pieces no longer than the target duration
#[derive(Debug, Clone)]
pub struct SegmentNormalizer {
    target_duration_ms: u64,
    min_duration_ms: u64,
}

impl SegmentNormalizer {
    pub fn new(target_duration_ms: u64, min_duration_ms: u64) -> Self {
        Self {
            target_duration_ms,
            min_duration_ms,
        }
    }

    pub fn normalize(&self, spans: Vec<AudioBuffer>) -> Vec<AudioBuffer> {
        let mut pieces = Vec::with_capacity(spans.len());

        for span in spans {
            let target = span.frames_for_ms(self.target_duration_ms).max(1);
            let total = span.frame_count();

            if total < target {
                pieces.push(span);
                continue;
            }

            let full = total / target;
            pieces.extend((0..full).map(|i| span.slice(i * target..(i + 1) * target)));

            let remainder = total - full * target;
            if remainder == 0 {
                continue;
            }
            if remainder >= span.frames_for_ms(self.min_duration_ms) {
                pieces.push(span.slice(full * target..total));
            } else {
                log::debug!(
                    "Dropping {} frame remainder of {} ms span (below {} ms minimum)",
                    remainder,
                    span.duration_ms(),
                    self.min_duration_ms
                );
            }
        }

        pieces
    }
}
