//! Splitter Core - Silence-aware audio segmentation
//!
//! Removes silent stretches from decoded audio and re-chunks what remains into
//! segments bounded by a target and a minimum duration.

pub mod audio;
pub mod batch;
pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod join;
pub mod normalize;
pub mod silence;

pub use batch::{BatchObserver, BatchResult, BatchRunner, CancelHandle};
pub use buffer::AudioBuffer;
pub use config::{
    ArchiveOptions, OutputFormat, SegmentationParameters, SilenceParameters, SplitterConfig,
};
pub use engine::{NamedSegment, SegmentationEngine};
pub use error::{SplitError, SplitResult};
pub use join::SegmentJoiner;
pub use normalize::SegmentNormalizer;
pub use silence::SilenceDetector;

/// Segment a single audio file with the given configuration
pub fn split_file(
    audio_path: &std::path::Path,
    config: &SplitterConfig,
) -> SplitResult<Vec<NamedSegment>> {
    config.validate()?;

    let engine = SegmentationEngine::new(config.silence.clone(), config.segmentation.clone());
    engine.process_file(audio_path, &audio::FileDecoder::new())
}
