//! Run configuration
//!
//! Built once at run start, validated eagerly and never mutated afterwards.
//! Defaults match the values the desktop front-end ships with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{SplitError, SplitResult};

/// Accepted range for the silence threshold, in dBFS
pub const THRESHOLD_DB_RANGE: (f64, f64) = (-100.0, 0.0);

/// Upper bound for every duration parameter (24 hours)
pub const MAX_DURATION_MS: u64 = 24 * 60 * 60 * 1000;

/// Complete configuration for a splitting run
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SplitterConfig {
    #[serde(default)]
    pub silence: SilenceParameters,
    #[serde(default)]
    pub segmentation: SegmentationParameters,
    #[serde(default)]
    pub archive: ArchiveOptions,
}

/// Silence detection parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SilenceParameters {
    /// Level below which audio counts as silent (dBFS)
    #[serde(default = "default_threshold_db")]
    pub threshold_db: f64,
    /// Minimum contiguous silence length
    #[serde(default = "default_min_silence_gap_ms")]
    pub min_silence_gap_ms: u64,
}

impl Default for SilenceParameters {
    fn default() -> Self {
        Self {
            threshold_db: default_threshold_db(),
            min_silence_gap_ms: default_min_silence_gap_ms(),
        }
    }
}

fn default_threshold_db() -> f64 {
    -40.0
}
fn default_min_silence_gap_ms() -> u64 {
    1000
}

/// Segment length bounds and output format
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SegmentationParameters {
    #[serde(default = "default_target_duration_ms")]
    pub target_duration_ms: u64,
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: u64,
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl Default for SegmentationParameters {
    fn default() -> Self {
        Self {
            target_duration_ms: default_target_duration_ms(),
            min_duration_ms: default_min_duration_ms(),
            output_format: OutputFormat::default(),
        }
    }
}

fn default_target_duration_ms() -> u64 {
    10_000
}
fn default_min_duration_ms() -> u64 {
    3_000
}

/// Archive packaging options
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveOptions {
    #[serde(default = "default_archive_name")]
    pub file_name: String,
    /// Add a `manifest.json` entry describing every segment
    #[serde(default = "default_manifest")]
    pub manifest: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            file_name: default_archive_name(),
            manifest: default_manifest(),
        }
    }
}

fn default_archive_name() -> String {
    "split_audio.zip".to_string()
}
fn default_manifest() -> bool {
    true
}

/// Encoded format of exported segments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Wav,
    Mp3,
    Flac,
    Ogg,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Wav,
        OutputFormat::Mp3,
        OutputFormat::Flac,
        OutputFormat::Ogg,
    ];

    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Flac => "flac",
            OutputFormat::Ogg => "ogg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().trim_start_matches('.').to_ascii_lowercase();
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.extension() == lower)
            .ok_or_else(|| format!("unsupported output format '{}' (expected wav, mp3, flac or ogg)", s))
    }
}

impl SplitterConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> SplitResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SplitError::Config {
            path: path.to_path_buf(),
            cause: e.into(),
        })?;
        let config: SplitterConfig = toml::from_str(&content).map_err(|e| SplitError::Config {
            path: path.to_path_buf(),
            cause: e.into(),
        })?;
        Ok(config)
    }

    /// Validate parameters before any decoding starts
    pub fn validate(&self) -> SplitResult<()> {
        let seg = &self.segmentation;
        check_duration("target_duration_ms", seg.target_duration_ms)?;
        check_duration("min_duration_ms", seg.min_duration_ms)?;

        let silence = &self.silence;
        let (lo, hi) = THRESHOLD_DB_RANGE;
        if !(lo..=hi).contains(&silence.threshold_db) {
            return Err(SplitError::invalid("threshold_db", silence.threshold_db));
        }
        check_duration("min_silence_gap_ms", silence.min_silence_gap_ms)?;

        if self.archive.file_name.trim().is_empty() {
            return Err(SplitError::invalid("archive.file_name", "\"\""));
        }

        if seg.min_duration_ms > seg.target_duration_ms {
            log::warn!(
                "min_duration_ms ({}) exceeds target_duration_ms ({}); no segment can be produced",
                seg.min_duration_ms,
                seg.target_duration_ms
            );
        }

        Ok(())
    }
}

/// Durations must be positive and no longer than [`MAX_DURATION_MS`]
fn check_duration(field: &'static str, ms: u64) -> SplitResult<()> {
    if ms == 0 || ms > MAX_DURATION_MS {
        return Err(SplitError::invalid(field, ms));
    }
    Ok(())
}
