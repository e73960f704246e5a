//! Audio decoding for multiple formats

use super::{decode_with_probe, AudioFormat};
use crate::buffer::AudioBuffer;
use anyhow::{Context, Result};
use std::path::Path;

/// Loads an input file into a PCM buffer
pub trait Decoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<AudioBuffer>;
}

impl<F> Decoder for F
where
    F: Fn(&Path) -> Result<AudioBuffer> + Send + Sync,
{
    fn decode(&self, path: &Path) -> Result<AudioBuffer> {
        self(path)
    }
}

/// Decoder for audio files on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDecoder;

impl FileDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<AudioBuffer> {
        decode_audio(path)
    }
}

/// Decode audio file at its native sample rate and channel layout
pub fn decode_audio(path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        anyhow::bail!("Audio file not found: {}", path.display());
    }

    let buffer = match AudioFormat::from_path(path) {
        AudioFormat::Wav => decode_wav(path)?,
        AudioFormat::Mp3 => decode_mp3(path)?,
        AudioFormat::Flac => decode_flac(path)?,
        AudioFormat::Ogg => decode_ogg(path)?,
        AudioFormat::Other => decode_with_probe(path)?,
    };

    log::debug!(
        "Decoded {}: {} ms, {} frames @ {} Hz, {} channel(s)",
        path.display(),
        buffer.duration_ms(),
        buffer.frame_count(),
        buffer.sample_rate(),
        buffer.channels()
    );

    Ok(buffer)
}

/// Decode WAV file
fn decode_wav(path: &Path) -> Result<AudioBuffer> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;

    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(AudioBuffer::new(samples, spec.sample_rate, spec.channels))
}

/// Decode MP3 file
fn decode_mp3(path: &Path) -> Result<AudioBuffer> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read MP3 file: {}", path.display()))?;

    let mut decoder = minimp3::Decoder::new(&data[..]);
    let mut samples = Vec::new();
    let mut sample_rate = 0;
    let mut channels = 0;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = frame.sample_rate as u32;
                    channels = frame.channels as u16;
                }
                samples.extend(frame.data.iter().map(|&s| s as f32 / 32768.0));
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => anyhow::bail!("MP3 decode error: {}", e),
        }
    }

    if sample_rate == 0 {
        anyhow::bail!("No MP3 frames found in {}", path.display());
    }

    Ok(AudioBuffer::new(samples, sample_rate, channels))
}

/// Decode FLAC file
fn decode_flac(path: &Path) -> Result<AudioBuffer> {
    let mut reader = claxon::FlacReader::open(path)
        .with_context(|| format!("Failed to open FLAC file: {}", path.display()))?;

    let info = reader.streaminfo();
    let max_val = (1i64 << (info.bits_per_sample - 1)) as f32;

    let samples: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|v| v as f32 / max_val))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AudioBuffer::new(samples, info.sample_rate, info.channels as u16))
}

/// Decode OGG Vorbis file
fn decode_ogg(path: &Path) -> Result<AudioBuffer> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open OGG file: {}", path.display()))?;

    let mut reader = lewton::inside_ogg::OggStreamReader::new(file)?;

    let sample_rate = reader.ident_hdr.audio_sample_rate;
    let channels = reader.ident_hdr.audio_channels as u16;

    let mut samples = Vec::new();
    while let Some(packet) = reader.read_dec_packet_itl()? {
        samples.extend(packet.iter().map(|&s| s as f32 / 32768.0));
    }

    Ok(AudioBuffer::new(samples, sample_rate, channels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, samples: &[i16], sample_rate: u32, channels: u16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_wav_keeps_native_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, &[16384, -16384, 0, 32767], 8000, 2);

        let buffer = decode_audio(&path).unwrap();
        assert_eq!(buffer.sample_rate(), 8000);
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.frame_count(), 2);
        approx::assert_abs_diff_eq!(buffer.samples()[0], 0.5, epsilon = 1e-4);
        approx::assert_abs_diff_eq!(buffer.samples()[1], -0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_missing_file_fails() {
        let err = decode_audio(Path::new("/definitely/not/here.wav")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_corrupt_wav_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"RIFF but not really").unwrap();

        assert!(FileDecoder::new().decode(&path).is_err());
    }

    #[test]
    fn test_closure_is_a_decoder() {
        let decoder = |_: &Path| Ok::<_, anyhow::Error>(AudioBuffer::new(vec![0.0; 10], 10, 1));
        let buffer = Decoder::decode(&decoder, Path::new("any")).unwrap();
        assert_eq!(buffer.duration_ms(), 1000);
    }
}
