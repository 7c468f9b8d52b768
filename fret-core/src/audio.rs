//! # Audio Buffer Module
//!
//! The analysis core does not capture audio. A capture front-end (microphone
//! callback, WAV loader) accumulates samples on its own thread and, once it
//! stops, hands an immutable [`SampleBuffer`] snapshot to the pipeline.

use serde::{Deserialize, Serialize};

/// Sample rate used when the capture side does not say otherwise.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// A mono block of samples plus the rate it was captured at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    /// Builds a mono buffer from interleaved multi-channel audio.
    ///
    /// Each frame is averaged across its channels. A trailing partial frame
    /// is dropped, and zero channels yield an empty buffer.
    ///
    /// # Arguments
    /// * `interleaved` - Samples laid out as `[l0, r0, l1, r1, ...]`
    /// * `channels` - Number of channels per frame
    /// * `sample_rate` - Sample rate in Hz
    pub fn from_interleaved(interleaved: &[f32], channels: usize, sample_rate: u32) -> Self {
        if channels == 0 {
            return Self::new(Vec::new(), sample_rate);
        }
        let samples = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        Self::new(samples, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the buffer in seconds, 0 when the sample rate is 0.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

impl AsRef<[f32]> for SampleBuffer {
    fn as_ref(&self) -> &[f32] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_interleaved_averages_channels() {
        let buffer = SampleBuffer::from_interleaved(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, 48000);
        assert_eq!(buffer.samples(), &[0.5, 0.5, 0.0]);
        assert_eq!(buffer.sample_rate(), 48000);
    }

    #[test]
    fn test_from_interleaved_drops_partial_frame() {
        let buffer = SampleBuffer::from_interleaved(&[0.2, 0.4, 0.6], 2, 44100);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_from_interleaved_zero_channels_is_empty() {
        let buffer = SampleBuffer::from_interleaved(&[0.2, 0.4], 0, 44100);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_duration() {
        let buffer = SampleBuffer::new(vec![0.0; 22050], DEFAULT_SAMPLE_RATE);
        assert!((buffer.duration_secs() - 0.5).abs() < 1e-6);
        assert_eq!(SampleBuffer::new(vec![0.0; 4], 0).duration_secs(), 0.0);
    }
}
