//! Background splitting job
//!
//! The batch runs on a blocking worker thread. Inputs are moved in by value;
//! progress and the final outcome come back over a channel, so the calling
//! task never shares mutable state with the worker.

use anyhow::{Context, Result};
use serde::Serialize;
use splitter_core::audio::{Decoder, FileDecoder};
use splitter_core::{
    BatchObserver, BatchRunner, CancelHandle, NamedSegment, SplitError, SplitResult,
    SplitterConfig,
};
use splitter_pack::{pack_segments, DefaultEncoder, SegmentEncoder};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Everything a run needs, captured at start
#[derive(Debug, Clone)]
pub struct SplitJob {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub config: SplitterConfig,
}

/// Result of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub archive: PathBuf,
    pub files: usize,
    pub segments: usize,
    pub entries: Vec<String>,
    pub processing_time_seconds: f64,
}

/// Notifications sent from the worker
#[derive(Debug)]
pub enum JobEvent {
    /// Fraction of input files completed, once per file
    Progress(f64),
    Finished(JobReport),
    Failed(SplitError),
}

/// Handle to a running job
pub struct JobHandle {
    events: mpsc::UnboundedReceiver<JobEvent>,
    cancel: CancelHandle,
    task: JoinHandle<()>,
}

impl JobHandle {
    /// Ask the worker to stop before its next input file
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Next event, or `None` once the worker is done
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        self.events.recv().await
    }

    /// Drain events until the job ends, forwarding progress to `on_progress`
    pub async fn wait(mut self, mut on_progress: impl FnMut(f64)) -> Result<JobReport> {
        let mut outcome = None;
        while let Some(event) = self.events.recv().await {
            match event {
                JobEvent::Progress(fraction) => on_progress(fraction),
                JobEvent::Finished(report) => outcome = Some(Ok(report)),
                JobEvent::Failed(err) => outcome = Some(Err(err)),
            }
        }

        self.task.await.context("Splitting worker panicked")?;

        match outcome {
            Some(Ok(report)) => Ok(report),
            Some(Err(err)) => Err(err.into()),
            None => anyhow::bail!("Splitting worker exited without a result"),
        }
    }
}

/// Start `job` with the filesystem decoder and the default encoder
///
/// Must be called from within a Tokio runtime.
pub fn spawn_job(job: SplitJob) -> JobHandle {
    spawn_job_with(job, Arc::new(FileDecoder::new()), Arc::new(DefaultEncoder::new()))
}

/// Start `job` with explicit decode/encode collaborators
pub fn spawn_job_with(
    job: SplitJob,
    decoder: Arc<dyn Decoder>,
    encoder: Arc<dyn SegmentEncoder>,
) -> JobHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancelHandle::new();
    let worker_cancel = cancel.clone();

    let task = tokio::task::spawn_blocking(move || {
        let result = run_job(&job, decoder.as_ref(), encoder.as_ref(), worker_cancel, |f| {
            // Receiver may be gone if the caller stopped listening
            let _ = tx.send(JobEvent::Progress(f));
        });

        let event = match result {
            Ok(report) => JobEvent::Finished(report),
            Err(err) => {
                log::error!("Run failed: {}", err);
                JobEvent::Failed(err)
            }
        };
        let _ = tx.send(event);
    });

    JobHandle {
        events: rx,
        cancel,
        task,
    }
}

/// Collects segments on the worker and forwards progress
struct WorkerObserver<F> {
    segments: Vec<NamedSegment>,
    on_progress: F,
}

impl<F: FnMut(f64)> BatchObserver for WorkerObserver<F> {
    fn on_progress(&mut self, fraction: f64) {
        (self.on_progress)(fraction);
    }

    fn on_segment(&mut self, segment: NamedSegment) {
        self.segments.push(segment);
    }
}

/// Run a whole job synchronously: segment every input, then package
///
/// Segments are only packaged once every input succeeded; a failure discards
/// all work done so far.
pub fn run_job(
    job: &SplitJob,
    decoder: &dyn Decoder,
    encoder: &dyn SegmentEncoder,
    cancel: CancelHandle,
    on_progress: impl FnMut(f64),
) -> SplitResult<JobReport> {
    let start = Instant::now();

    let runner = BatchRunner::new(&job.config)?.with_cancel(cancel);

    let format = job.config.segmentation.output_format;
    if !encoder.supports(format) {
        return Err(SplitError::encode(
            "all segments",
            format,
            "no encoder available (is ffmpeg installed?)",
        ));
    }

    let mut observer = WorkerObserver {
        segments: Vec::new(),
        on_progress,
    };
    runner.run(&job.inputs, decoder, &mut observer)?;

    let summary = pack_segments(&observer.segments, &job.config, encoder, &job.output_dir)?;

    Ok(JobReport {
        archive: summary.archive,
        files: job.inputs.len(),
        segments: observer.segments.len(),
        entries: summary.entries,
        processing_time_seconds: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitter_core::AudioBuffer;
    use std::path::Path;

    fn tone_decoder(path: &Path) -> anyhow::Result<AudioBuffer> {
        let secs: usize = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| anyhow::anyhow!("cannot decode {}", path.display()))?;
        Ok(AudioBuffer::new(vec![0.5; secs * 1000], 1000, 1))
    }

    fn job(dir: &Path, inputs: &[&str]) -> SplitJob {
        SplitJob {
            inputs: inputs.iter().map(PathBuf::from).collect(),
            output_dir: dir.to_path_buf(),
            config: SplitterConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_job_reports_progress_then_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let handle = spawn_job_with(
            job(dir.path(), &["12", "4"]),
            Arc::new(tone_decoder),
            Arc::new(DefaultEncoder::default()),
        );

        let mut progress = Vec::new();
        let report = handle.wait(|f| progress.push(f)).await.unwrap();

        assert_eq!(progress, vec![0.5, 1.0]);
        assert_eq!(report.files, 2);
        // 12s -> 10s (2s remainder dropped); 4s -> 4s
        assert_eq!(report.segments, 2);
        assert_eq!(
            report.entries,
            vec!["segment_1.wav", "segment_1_1.wav", "manifest.json"]
        );
        assert!(report.archive.exists());
    }

    #[tokio::test]
    async fn test_job_failure_is_terminal_event() {
        let dir = tempfile::tempdir().unwrap();
        let mut handle = spawn_job_with(
            job(dir.path(), &["10", "garbage"]),
            Arc::new(tone_decoder),
            Arc::new(DefaultEncoder::default()),
        );

        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], JobEvent::Progress(f) if f == 0.5));
        match &events[1] {
            JobEvent::Failed(SplitError::Decode { path, .. }) => {
                assert_eq!(path, Path::new("garbage"))
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(!dir.path().join("split_audio.zip").exists());
    }

    #[tokio::test]
    async fn test_empty_job_fails() {
        let dir = tempfile::tempdir().unwrap();
        let handle = spawn_job_with(
            job(dir.path(), &[]),
            Arc::new(tone_decoder),
            Arc::new(DefaultEncoder::default()),
        );

        let err = handle.wait(|_| {}).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SplitError>(),
            Some(SplitError::EmptyBatch)
        ));
    }

    #[test]
    fn test_unsupported_format_fails_before_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job(dir.path(), &["10"]);
        job.config.segmentation.output_format = splitter_core::OutputFormat::Mp3;

        let decoder = |_: &Path| -> anyhow::Result<AudioBuffer> { panic!("decoder must not run") };
        let err = run_job(
            &job,
            &decoder,
            &DefaultEncoder::default(),
            CancelHandle::new(),
            |_| {},
        )
        .unwrap_err();

        assert!(matches!(err, SplitError::Encode { .. }));
    }

    #[test]
    fn test_cancelled_job_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancelHandle::new();
        cancel.cancel();

        let err = run_job(
            &job(dir.path(), &["10"]),
            &tone_decoder,
            &DefaultEncoder::default(),
            cancel,
            |_| {},
        )
        .unwrap_err();

        assert!(matches!(err, SplitError::Cancelled));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
