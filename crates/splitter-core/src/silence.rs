//! Silence detection
//!
//! Audio is measured in 1 ms windows. A window is silent when its RMS level is
//! below the threshold; a run of silent windows only counts as silence once it
//! spans at least the minimum gap. Shorter quiet runs stay attached to the
//! surrounding audio.

use std::ops::Range;

use crate::buffer::AudioBuffer;
use crate::config::SilenceParameters;

/// Splits a buffer into its non-silent spans
#[derive(Debug, Clone)]
pub struct SilenceDetector {
    threshold_db: f64,
    min_silence_gap_ms: u64,
}

impl SilenceDetector {
    pub fn new(params: &SilenceParameters) -> Self {
        Self {
            threshold_db: params.threshold_db,
            min_silence_gap_ms: params.min_silence_gap_ms,
        }
    }

    /// Non-silent spans of `buffer`, in original order
    pub fn detect(&self, buffer: &AudioBuffer) -> Vec<AudioBuffer> {
        self.sound_ranges(buffer)
            .into_iter()
            .map(|range| buffer.slice(range))
            .collect()
    }

    /// Frame ranges of silence stretches in `buffer`
    pub fn silent_ranges(&self, buffer: &AudioBuffer) -> Vec<Range<usize>> {
        let total = buffer.frame_count();
        if total == 0 {
            return Vec::new();
        }

        let window = window_frames(buffer.sample_rate());
        let min_gap = buffer.frames_for_ms(self.min_silence_gap_ms).max(1);
        let channels = buffer.channels() as usize;
        let samples = buffer.samples();

        let mut ranges = Vec::new();
        let mut run_start: Option<usize> = None;

        for start in (0..total).step_by(window) {
            let end = (start + window).min(total);
            let chunk = &samples[start * channels..end * channels];

            if level_db(chunk) < self.threshold_db {
                run_start.get_or_insert(start);
            } else if let Some(run) = run_start.take() {
                if start - run >= min_gap {
                    ranges.push(run..start);
                }
            }
        }

        if let Some(run) = run_start {
            if total - run >= min_gap {
                ranges.push(run..total);
            }
        }

        ranges
    }

    /// Frame ranges between the silence stretches
    pub fn sound_ranges(&self, buffer: &AudioBuffer) -> Vec<Range<usize>> {
        let total = buffer.frame_count();
        let mut ranges = Vec::new();
        let mut cursor = 0;

        for silence in self.silent_ranges(buffer) {
            if silence.start > cursor {
                ranges.push(cursor..silence.start);
            }
            cursor = silence.end;
        }
        if cursor < total {
            ranges.push(cursor..total);
        }

        log::debug!(
            "Found {} non-silent span(s) in {} ms of audio",
            ranges.len(),
            buffer.duration_ms()
        );

        ranges
    }
}

/// Frames per measurement window (1 ms, at least one frame)
fn window_frames(sample_rate: u32) -> usize {
    (sample_rate as usize / 1000).max(1)
}

/// RMS level of interleaved samples in dBFS; digital silence is -inf
pub fn level_db(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return f64::NEG_INFINITY;
    }

    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    let rms = (sum_sq / samples.len() as f64).sqrt();
    if rms == 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * rms.log10()
    }
}
