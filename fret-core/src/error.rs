//! Error types for the analysis core.
//!
//! Analysis itself never fails: silent or short buffers produce empty results.
//! The only thing that can be rejected is an inconsistent [`AnalysisConfig`].
//!
//! [`AnalysisConfig`]: crate::config::AnalysisConfig

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be positive")]
    ZeroSampleRate,
    #[error("window size must be at least one sample")]
    ZeroWindowSize,
    #[error("hop size must be at least one sample")]
    ZeroHopSize,
    #[error("at least one analysis window is required")]
    ZeroWindows,
    #[error("top_n must be at least 1")]
    ZeroTopN,
    #[error("invalid frequency band: {min_freq} Hz to {max_freq} Hz")]
    InvalidBand { min_freq: f32, max_freq: f32 },
    #[error("peak threshold {0} is outside [0, 1]")]
    InvalidThreshold(f32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
