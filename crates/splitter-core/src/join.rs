//! Greedy joining of normalized pieces
//!
//! One accumulator is kept open. A piece is appended while the total stays
//! within the target; otherwise the accumulator is flushed and the piece opens
//! a new one. Flushed accumulators shorter than the minimum are dropped.
//! Single pass, no look-ahead.

use crate::buffer::AudioBuffer;

/// Accumulates pieces into segments bounded by target and minimum duration
#[derive(Debug, Clone)]
pub struct SegmentJoiner {
    target_duration_ms: u64,
    min_duration_ms: u64,
}

/// Pieces collected for the segment being built
struct Accumulator {
    parts: Vec<AudioBuffer>,
    frames: usize,
}

impl Accumulator {
    fn open(piece: AudioBuffer) -> Self {
        Self {
            frames: piece.frame_count(),
            parts: vec![piece],
        }
    }

    fn push(&mut self, piece: AudioBuffer) {
        self.frames += piece.frame_count();
        self.parts.push(piece);
    }
}

impl SegmentJoiner {
    pub fn new(target_duration_ms: u64, min_duration_ms: u64) -> Self {
        Self {
            target_duration_ms,
            min_duration_ms,
        }
    }

    pub fn join(&self, pieces: Vec<AudioBuffer>) -> Vec<AudioBuffer> {
        let mut segments = Vec::new();
        let mut current: Option<Accumulator> = None;

        for piece in pieces {
            let target = piece.frames_for_ms(self.target_duration_ms);

            current = Some(match current.take() {
                None => Accumulator::open(piece),
                Some(mut acc) if acc.frames + piece.frame_count() <= target => {
                    acc.push(piece);
                    acc
                }
                Some(acc) => {
                    self.flush(acc, &mut segments);
                    Accumulator::open(piece)
                }
            });
        }

        if let Some(acc) = current {
            self.flush(acc, &mut segments);
        }

        segments
    }

    fn flush(&self, acc: Accumulator, segments: &mut Vec<AudioBuffer>) {
        let Some(segment) = AudioBuffer::concat(&acc.parts) else {
            return;
        };

        if segment.frame_count() >= segment.frames_for_ms(self.min_duration_ms) {
            segments.push(segment);
        } else {
            log::debug!(
                "Dropping {} ms segment built from {} piece(s) (below {} ms minimum)",
                segment.duration_ms(),
                acc.parts.len(),
                self.min_duration_ms
            );
        }
    }
}
