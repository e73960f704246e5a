//! Per-file segmentation pipeline
//!
//! decode -> detect silence -> normalize -> join -> minimum filter -> name

use std::path::{Path, PathBuf};

use crate::audio::Decoder;
use crate::buffer::AudioBuffer;
use crate::config::{SegmentationParameters, SilenceParameters};
use crate::error::{SplitError, SplitResult};
use crate::join::SegmentJoiner;
use crate::normalize::SegmentNormalizer;
use crate::silence::SilenceDetector;

/// Prefix of every generated segment name
pub const SEGMENT_PREFIX: &str = "segment_";

/// A finished output segment
#[derive(Debug, Clone)]
pub struct NamedSegment {
    /// `segment_<k>`, unique within its source file
    pub name: String,
    /// 1-based position among the segments kept for the source file
    pub index: usize,
    /// Input file the segment was cut from
    pub source: PathBuf,
    pub buffer: AudioBuffer,
}

impl NamedSegment {
    pub fn duration_ms(&self) -> u64 {
        self.buffer.duration_ms()
    }
}

/// Runs the segmentation pipeline for one input file
#[derive(Debug, Clone)]
pub struct SegmentationEngine {
    detector: SilenceDetector,
    normalizer: SegmentNormalizer,
    joiner: SegmentJoiner,
    min_duration_ms: u64,
}

impl SegmentationEngine {
    pub fn new(silence: SilenceParameters, segmentation: SegmentationParameters) -> Self {
        let target = segmentation.target_duration_ms;
        let min = segmentation.min_duration_ms;

        Self {
            detector: SilenceDetector::new(&silence),
            normalizer: SegmentNormalizer::new(target, min),
            joiner: SegmentJoiner::new(target, min),
            min_duration_ms: min,
        }
    }

    /// Decode `path` and cut it into named segments
    ///
    /// A decode failure is returned as [`SplitError::Decode`] carrying the path.
    pub fn process_file(&self, path: &Path, decoder: &dyn Decoder) -> SplitResult<Vec<NamedSegment>> {
        let audio = decoder
            .decode(path)
            .map_err(|e| SplitError::decode(path, e))?;

        log::info!(
            "Decoded {}: {:.1}s @ {} Hz",
            path.display(),
            audio.duration_ms() as f64 / 1000.0,
            audio.sample_rate()
        );

        let segments = self
            .segment(&audio)
            .into_iter()
            .enumerate()
            .map(|(i, buffer)| NamedSegment {
                name: format!("{}{}", SEGMENT_PREFIX, i + 1),
                index: i + 1,
                source: path.to_path_buf(),
                buffer,
            })
            .collect::<Vec<_>>();

        log::info!("{}: {} segment(s)", path.display(), segments.len());

        Ok(segments)
    }

    /// Segment an already decoded buffer
    pub fn segment(&self, audio: &AudioBuffer) -> Vec<AudioBuffer> {
        let spans = self.detector.detect(audio);
        let pieces = self.normalizer.normalize(spans);
        let joined = self.joiner.join(pieces);

        // The joiner already enforces the minimum; re-check with the same rule
        joined
            .into_iter()
            .filter(|s| s.frame_count() >= s.frames_for_ms(self.min_duration_ms))
            .collect()
    }
}
