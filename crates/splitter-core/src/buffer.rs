//! Immutable PCM audio buffer
//!
//! Samples are stored interleaved as `f32` in [-1.0, 1.0]. Slicing never copies:
//! every slice shares the decoded samples and only narrows the frame range.

use std::ops::Range;
use std::sync::Arc;

/// Interleaved PCM audio at a fixed sample rate
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Arc<[f32]>,
    /// Frame range of `samples` visible through this buffer
    frames: Range<usize>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    /// Wrap interleaved samples. A trailing incomplete frame is dropped.
    pub fn new(mut samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        let channels = channels.max(1);
        let frame_count = samples.len() / channels as usize;
        samples.truncate(frame_count * channels as usize);

        Self {
            samples: samples.into(),
            frames: 0..frame_count,
            sample_rate,
            channels,
        }
    }

    pub fn empty(sample_rate: u32, channels: u16) -> Self {
        Self::new(Vec::new(), sample_rate, channels)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sample frames (one sample per channel)
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Duration in whole milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frame_count() as u64 * 1000 / self.sample_rate as u64
    }

    /// Number of frames covering `ms` milliseconds at this buffer's rate
    ///
    /// Saturates at `usize::MAX` for durations no buffer can hold.
    pub fn frames_for_ms(&self, ms: u64) -> usize {
        let frames = ms as u128 * self.sample_rate as u128 / 1000;
        usize::try_from(frames).unwrap_or(usize::MAX)
    }

    /// Interleaved samples of the visible range
    pub fn samples(&self) -> &[f32] {
        let ch = self.channels as usize;
        &self.samples[self.frames.start * ch..self.frames.end * ch]
    }

    /// Sub-buffer over a frame range relative to this buffer
    ///
    /// The range is clamped to the buffer bounds.
    pub fn slice(&self, range: Range<usize>) -> AudioBuffer {
        let len = self.frame_count();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);

        Self {
            samples: Arc::clone(&self.samples),
            frames: self.frames.start + start..self.frames.start + end,
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Whether two buffers can be concatenated without conversion
    pub fn same_format(&self, other: &AudioBuffer) -> bool {
        self.sample_rate == other.sample_rate && self.channels == other.channels
    }

    /// Concatenate buffers in order into one buffer
    ///
    /// All parts must share the format of the first one. A single part is
    /// returned as-is without copying samples.
    pub fn concat(parts: &[AudioBuffer]) -> Option<AudioBuffer> {
        let first = parts.first()?;
        if parts.len() == 1 {
            return Some(first.clone());
        }

        debug_assert!(parts.iter().all(|p| p.same_format(first)));

        let total: usize = parts.iter().map(|p| p.samples().len()).sum();
        let mut samples = Vec::with_capacity(total);
        for part in parts {
            samples.extend_from_slice(part.samples());
        }

        Some(AudioBuffer::new(samples, first.sample_rate, first.channels))
    }

    /// Offset of this buffer's first frame within the decoded source
    pub fn source_offset(&self) -> usize {
        self.frames.start
    }
}

impl PartialEq for AudioBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.same_format(other) && self.samples() == other.samples()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize, channels: u16) -> AudioBuffer {
        let samples = (0..frames * channels as usize).map(|i| i as f32).collect();
        AudioBuffer::new(samples, 1000, channels)
    }

    #[test]
    fn test_duration_from_frames() {
        let buf = AudioBuffer::new(vec![0.0; 44100 * 2 * 3], 44100, 2);
        assert_eq!(buf.frame_count(), 44100 * 3);
        assert_eq!(buf.duration_ms(), 3000);
    }

    #[test]
    fn test_trailing_partial_frame_dropped() {
        let buf = AudioBuffer::new(vec![0.0; 5], 1000, 2);
        assert_eq!(buf.frame_count(), 2);
        assert_eq!(buf.samples().len(), 4);
    }

    #[test]
    fn test_slice_shares_source() {
        let buf = ramp(10, 2);
        let slice = buf.slice(2..5);

        assert_eq!(slice.frame_count(), 3);
        assert_eq!(slice.samples(), &[4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert!(Arc::ptr_eq(&buf.samples, &slice.samples));
        // Source is untouched
        assert_eq!(buf.frame_count(), 10);
    }

    #[test]
    fn test_nested_slice_is_relative() {
        let buf = ramp(10, 1);
        let inner = buf.slice(4..10).slice(1..3);
        assert_eq!(inner.samples(), &[5.0, 6.0]);
        assert_eq!(inner.source_offset(), 5);
    }

    #[test]
    fn test_slice_clamps_out_of_range() {
        let buf = ramp(10, 1);
        assert_eq!(buf.slice(8..20).frame_count(), 2);
        assert!(buf.slice(12..20).is_empty());
    }

    #[test]
    fn test_frames_for_ms_saturates() {
        let buf = AudioBuffer::empty(44_100, 2);
        assert_eq!(buf.frames_for_ms(250), 11_025);
        assert_eq!(buf.frames_for_ms(u64::MAX), usize::MAX);
    }

    #[test]
    fn test_concat_copies_in_order() {
        let buf = ramp(6, 1);
        let joined = AudioBuffer::concat(&[buf.slice(4..6), buf.slice(0..2)]).unwrap();
        assert_eq!(joined.samples(), &[4.0, 5.0, 0.0, 1.0]);
    }

    #[test]
    fn test_concat_empty_is_none() {
        assert!(AudioBuffer::concat(&[]).is_none());
    }
}
