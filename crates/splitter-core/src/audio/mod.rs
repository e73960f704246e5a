//! Audio decoding
//!
//! Supports WAV, MP3, FLAC and OGG with dedicated pure Rust decoders; anything
//! else is handed to Symphonia's format probe.

mod container;
mod decoder;

pub use container::decode_with_probe;
pub use decoder::{decode_audio, Decoder, FileDecoder};

use std::path::Path;

/// Input formats with a dedicated decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
    Ogg,

    /// Let the probe figure it out (m4a, aac, mkv, ...)
    Other,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("wav") | Some("wave") => AudioFormat::Wav,
            Some("mp3") => AudioFormat::Mp3,
            Some("flac") => AudioFormat::Flac,
            Some("ogg") | Some("oga") => AudioFormat::Ogg,
            _ => AudioFormat::Other,
        }
    }
}
