//! Batch processing across input files
//!
//! Files are processed strictly in the given order. Progress is reported once
//! per completed file. Any failure aborts the whole run.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::audio::Decoder;
use crate::config::SplitterConfig;
use crate::engine::{NamedSegment, SegmentationEngine};
use crate::error::{SplitError, SplitResult};

/// Receives progress and segments while a batch runs
pub trait BatchObserver {
    /// Called after each completed file with `completed / total`
    fn on_progress(&mut self, fraction: f64);

    /// Called for every segment, in output order
    fn on_segment(&mut self, segment: NamedSegment);
}

/// Segments and progress collected over a whole run
#[derive(Debug, Default)]
pub struct BatchResult {
    pub segments: Vec<NamedSegment>,
    pub progress: Vec<f64>,
}

impl BatchObserver for BatchResult {
    fn on_progress(&mut self, fraction: f64) {
        self.progress.push(fraction);
    }

    fn on_segment(&mut self, segment: NamedSegment) {
        self.segments.push(segment);
    }
}

/// Request to stop a run before its next file
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives the segmentation engine over a list of files
#[derive(Debug, Clone)]
pub struct BatchRunner {
    engine: SegmentationEngine,
    cancel: Option<CancelHandle>,
}

impl BatchRunner {
    /// Validate `config` and build a runner for it
    pub fn new(config: &SplitterConfig) -> SplitResult<Self> {
        config.validate()?;

        Ok(Self {
            engine: SegmentationEngine::new(config.silence.clone(), config.segmentation.clone()),
            cancel: None,
        })
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Process `paths` in order, reporting to `observer`
    ///
    /// Returns the number of segments produced.
    pub fn run(
        &self,
        paths: &[PathBuf],
        decoder: &dyn Decoder,
        observer: &mut dyn BatchObserver,
    ) -> SplitResult<usize> {
        if paths.is_empty() {
            return Err(SplitError::EmptyBatch);
        }

        let total = paths.len();
        let mut produced = 0;

        for (i, path) in paths.iter().enumerate() {
            if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                log::info!("Run cancelled after {}/{} file(s)", i, total);
                return Err(SplitError::Cancelled);
            }

            log::info!("[{}/{}] Processing {}", i + 1, total, path.display());

            let segments = self.engine.process_file(path, decoder)?;
            produced += segments.len();
            for segment in segments {
                observer.on_segment(segment);
            }

            observer.on_progress((i + 1) as f64 / total as f64);
        }

        log::info!("Finished {} file(s), {} segment(s)", total, produced);

        Ok(produced)
    }

    /// Process `paths` and collect everything into a [`BatchResult`]
    pub fn collect(&self, paths: &[PathBuf], decoder: &dyn Decoder) -> SplitResult<BatchResult> {
        let mut result = BatchResult::default();
        self.run(paths, decoder, &mut result)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::AudioBuffer;
    use crate::silence::tests::{buffer, tone};
    use std::path::Path;

    /// Decodes "<seconds>s.wav" into a tone of that length; anything else fails
    fn by_name(path: &Path) -> anyhow::Result<AudioBuffer> {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let secs: u64 = stem
            .trim_end_matches('s')
            .parse()
            .map_err(|_| anyhow::anyhow!("cannot decode {}", path.display()))?;
        Ok(buffer(&[tone(secs * 1000)]))
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn runner() -> BatchRunner {
        BatchRunner::new(&SplitterConfig::default()).unwrap()
    }

    #[test]
    fn test_progress_once_per_file() {
        let result = runner()
            .collect(&paths(&["30s.wav", "2s.wav", "25s.wav", "12s.wav"]), &by_name)
            .unwrap();

        assert_eq!(result.progress, vec![0.25, 0.5, 0.75, 1.0]);
        assert!(result.progress.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_segments_in_file_order() {
        let result = runner()
            .collect(&paths(&["25s.wav", "10s.wav"]), &by_name)
            .unwrap();

        let names: Vec<(String, String)> = result
            .segments
            .iter()
            .map(|s| (s.source.display().to_string(), s.name.clone()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("25s.wav".to_string(), "segment_1".to_string()),
                ("25s.wav".to_string(), "segment_2".to_string()),
                ("25s.wav".to_string(), "segment_3".to_string()),
                ("10s.wav".to_string(), "segment_1".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_batch_rejected() {
        let err = runner().collect(&[], &by_name).unwrap_err();
        assert!(matches!(err, SplitError::EmptyBatch));
    }

    #[test]
    fn test_invalid_config_rejected_before_run() {
        let mut config = SplitterConfig::default();
        config.segmentation.target_duration_ms = 0;
        assert!(matches!(
            BatchRunner::new(&config),
            Err(SplitError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_decode_failure_aborts_batch() {
        let mut result = BatchResult::default();
        let err = runner()
            .run(&paths(&["10s.wav", "corrupt.mp3", "20s.wav"]), &by_name, &mut result)
            .unwrap_err();

        match err {
            SplitError::Decode { path, .. } => assert_eq!(path, Path::new("corrupt.mp3")),
            other => panic!("unexpected error: {other}"),
        }
        // Only the first file completed; the third was never touched
        assert_eq!(result.progress, vec![1.0 / 3.0]);
        assert_eq!(result.segments.len(), 1);
    }

    #[test]
    fn test_cancel_stops_before_next_file() {
        struct CancelAfterFirst {
            cancel: CancelHandle,
            progress: Vec<f64>,
        }

        impl BatchObserver for CancelAfterFirst {
            fn on_progress(&mut self, fraction: f64) {
                self.progress.push(fraction);
                self.cancel.cancel();
            }
            fn on_segment(&mut self, _segment: NamedSegment) {}
        }

        let cancel = CancelHandle::new();
        let mut observer = CancelAfterFirst {
            cancel: cancel.clone(),
            progress: Vec::new(),
        };

        let err = runner()
            .with_cancel(cancel)
            .run(&paths(&["10s.wav", "10s.wav"]), &by_name, &mut observer)
            .unwrap_err();

        assert!(matches!(err, SplitError::Cancelled));
        assert_eq!(observer.progress, vec![0.5]);
    }

    #[test]
    fn test_run_returns_segment_count() {
        let mut result = BatchResult::default();
        let count = runner()
            .run(&paths(&["30s.wav", "5s.wav"]), &by_name, &mut result)
            .unwrap();
        assert_eq!(count, 4);
        assert_eq!(count, result.segments.len());
    }
}
