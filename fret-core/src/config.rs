//! # Analysis Configuration
//!
//! An immutable value describing how a buffer is analyzed: window geometry,
//! the frequency band searched for fundamentals and the peak policy.
//! The defaults reproduce the classic 4096-sample / 5-window setup.

use serde::{Deserialize, Serialize};

use crate::audio::DEFAULT_SAMPLE_RATE;
use crate::error::{ConfigError, ConfigResult};
use crate::fft::WindowFunction;

pub const DEFAULT_WINDOW_SIZE: usize = 4096;
pub const DEFAULT_HOP_SIZE: usize = DEFAULT_WINDOW_SIZE / 2;
pub const DEFAULT_NUM_WINDOWS: usize = 5;

/// Lowest frequency considered a playable fundamental.
pub const DEFAULT_MIN_FREQ: f32 = 60.0;
/// Highest frequency considered a playable fundamental.
pub const DEFAULT_MAX_FREQ: f32 = 1000.0;
/// Peaks below this fraction of the strongest in-band bin are ignored.
pub const DEFAULT_THRESHOLD: f32 = 0.1;
pub const DEFAULT_TOP_N: usize = 3;
/// Minimum separation, in bins, between two accepted peaks.
pub const DEFAULT_MIN_PEAK_DISTANCE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub sample_rate: u32,
    pub window_size: usize,
    pub hop_size: usize,
    pub num_windows: usize,
    /// Samples kept before the attack peak when anchoring the first window.
    pub pre_offset: usize,
    pub min_freq: f32,
    pub max_freq: f32,
    pub threshold: f32,
    pub top_n: usize,
    pub min_peak_distance: usize,
    pub window_function: WindowFunction,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            window_size: DEFAULT_WINDOW_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
            num_windows: DEFAULT_NUM_WINDOWS,
            pre_offset: DEFAULT_HOP_SIZE / 2,
            min_freq: DEFAULT_MIN_FREQ,
            max_freq: DEFAULT_MAX_FREQ,
            threshold: DEFAULT_THRESHOLD,
            top_n: DEFAULT_TOP_N,
            min_peak_distance: DEFAULT_MIN_PEAK_DISTANCE,
            window_function: WindowFunction::Rectangular,
        }
    }
}

impl AnalysisConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Sets the window size. The hop size and pre-offset are left untouched.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_hop_size(mut self, hop_size: usize) -> Self {
        self.hop_size = hop_size;
        self
    }

    pub fn with_num_windows(mut self, num_windows: usize) -> Self {
        self.num_windows = num_windows;
        self
    }

    pub fn with_pre_offset(mut self, pre_offset: usize) -> Self {
        self.pre_offset = pre_offset;
        self
    }

    pub fn with_band(mut self, min_freq: f32, max_freq: f32) -> Self {
        self.min_freq = min_freq;
        self.max_freq = max_freq;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_min_peak_distance(mut self, min_peak_distance: usize) -> Self {
        self.min_peak_distance = min_peak_distance;
        self
    }

    pub fn with_window_function(mut self, window_function: WindowFunction) -> Self {
        self.window_function = window_function;
        self
    }

    /// Checks that the configuration describes a usable analysis.
    ///
    /// # Returns
    /// * `Ok(())` - The configuration can be handed to a [`Pipeline`](crate::pipeline::Pipeline)
    /// * `Err(e)` - The first inconsistency found
    pub fn validate(&self) -> ConfigResult<()> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindowSize);
        }
        if self.hop_size == 0 {
            return Err(ConfigError::ZeroHopSize);
        }
        if self.num_windows == 0 {
            return Err(ConfigError::ZeroWindows);
        }
        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN);
        }
        let band_ok = self.min_freq.is_finite()
            && self.max_freq.is_finite()
            && self.min_freq >= 0.0
            && self.max_freq >= self.min_freq;
        if !band_ok {
            return Err(ConfigError::InvalidBand {
                min_freq: self.min_freq,
                max_freq: self.max_freq,
            });
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_setup() {
        let config = AnalysisConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.window_size, 4096);
        assert_eq!(config.hop_size, 2048);
        assert_eq!(config.num_windows, 5);
        assert_eq!(config.pre_offset, 1024);
        assert_eq!(config.top_n, 3);
        assert_eq!(config.min_peak_distance, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_degenerate_geometry() {
        let base = AnalysisConfig::default();
        assert_eq!(base.with_sample_rate(0).validate(), Err(ConfigError::ZeroSampleRate));
        assert_eq!(base.with_window_size(0).validate(), Err(ConfigError::ZeroWindowSize));
        assert_eq!(base.with_hop_size(0).validate(), Err(ConfigError::ZeroHopSize));
        assert_eq!(base.with_num_windows(0).validate(), Err(ConfigError::ZeroWindows));
        assert_eq!(base.with_top_n(0).validate(), Err(ConfigError::ZeroTopN));
    }

    #[test]
    fn test_validate_rejects_bad_band_and_threshold() {
        let base = AnalysisConfig::default();
        assert!(matches!(
            base.with_band(500.0, 100.0).validate(),
            Err(ConfigError::InvalidBand { .. })
        ));
        assert!(matches!(
            base.with_band(f32::NAN, 100.0).validate(),
            Err(ConfigError::InvalidBand { .. })
        ));
        assert_eq!(
            base.with_threshold(1.5).validate(),
            Err(ConfigError::InvalidThreshold(1.5))
        );
    }

    #[test]
    fn test_serde_round_trip_keeps_window_function() {
        let config = AnalysisConfig::default().with_window_function(WindowFunction::Hann);
        let json = serde_json::to_string(&config).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
