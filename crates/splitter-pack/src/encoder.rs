//! Segment encoding
//!
//! WAV is written in-process with hound. MP3, FLAC and OGG are delegated to an
//! `ffmpeg` binary found on `PATH`, fed through a temporary WAV file.

use anyhow::{Context, Result};
use splitter_core::{AudioBuffer, OutputFormat};
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Turns an audio buffer into the bytes of an encoded file
pub trait SegmentEncoder: Send + Sync {
    fn encode(&self, buffer: &AudioBuffer, format: OutputFormat) -> Result<Vec<u8>>;

    /// Whether `format` can be produced at all
    fn supports(&self, _format: OutputFormat) -> bool {
        true
    }
}

/// hound for WAV, ffmpeg for everything else
#[derive(Debug, Clone, Default)]
pub struct DefaultEncoder {
    ffmpeg: Option<PathBuf>,
}

impl DefaultEncoder {
    /// Create an encoder, looking up `ffmpeg` on `PATH`
    pub fn new() -> Self {
        let ffmpeg = which::which("ffmpeg").ok();
        match &ffmpeg {
            Some(path) => log::debug!("Using ffmpeg at {}", path.display()),
            None => log::debug!("ffmpeg not found in PATH; only wav output is available"),
        }
        Self { ffmpeg }
    }

    /// Use a specific ffmpeg binary
    pub fn with_ffmpeg(path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: Some(path.into()),
        }
    }

    fn encode_with_ffmpeg(&self, buffer: &AudioBuffer, format: OutputFormat) -> Result<Vec<u8>> {
        let ffmpeg = self
            .ffmpeg
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("ffmpeg not found in PATH; required for {} output", format))?;

        let input = tempfile::Builder::new()
            .prefix("segment-")
            .suffix(".wav")
            .tempfile()
            .context("Failed to create temporary WAV file")?;
        write_wav_file(input.path(), buffer)?;

        let output = tempfile::Builder::new()
            .prefix("segment-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()
            .context("Failed to create temporary output file")?;

        run_ffmpeg(ffmpeg, input.path(), output.path(), format)?;

        std::fs::read(output.path())
            .with_context(|| format!("Failed to read encoded {} output", format))
    }
}

impl SegmentEncoder for DefaultEncoder {
    fn encode(&self, buffer: &AudioBuffer, format: OutputFormat) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Wav => encode_wav(buffer),
            _ => self.encode_with_ffmpeg(buffer, format),
        }
    }

    fn supports(&self, format: OutputFormat) -> bool {
        format == OutputFormat::Wav || self.ffmpeg.is_some()
    }
}

fn wav_spec(buffer: &AudioBuffer) -> hound::WavSpec {
    hound::WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Convert a normalized sample to 16-bit PCM
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

fn write_samples<W: Write + Seek>(writer: W, buffer: &AudioBuffer) -> Result<()> {
    let mut wav = hound::WavWriter::new(writer, wav_spec(buffer))?;
    for &sample in buffer.samples() {
        wav.write_sample(to_i16(sample))?;
    }
    wav.finalize()?;
    Ok(())
}

/// Encode as 16-bit PCM WAV in memory
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_samples(&mut cursor, buffer).context("Failed to write WAV data")?;
    Ok(cursor.into_inner())
}

fn write_wav_file(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_samples(std::io::BufWriter::new(file), buffer)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn run_ffmpeg(ffmpeg: &Path, input: &Path, output: &Path, format: OutputFormat) -> Result<()> {
    log::debug!("ffmpeg {} -> {} ({})", input.display(), output.display(), format);

    let result = Command::new(ffmpeg)
        .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(input)
        .args(["-f", format.extension()])
        .arg(output)
        .output()
        .with_context(|| format!("Failed to run {}", ffmpeg.display()))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        anyhow::bail!(
            "ffmpeg exited with {}: {}",
            result.status,
            stderr.trim()
        );
    }

    Ok(())
}
