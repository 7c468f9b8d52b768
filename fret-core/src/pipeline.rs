//! # Detection Pipeline Module
//!
//! Runs a captured buffer through the whole analysis chain:
//!
//! 1. Anchor on the attack peak and average the spectra of the following windows
//! 2. Pick the strongest independent peaks in the playable band
//! 3. Map each peak to its nearest note
//! 4. List the string/fret positions that can produce that note
//!
//! Nothing here keeps state between calls, so one [`Pipeline`] can be shared
//! freely across threads.

use serde::{Deserialize, Serialize};

use crate::audio::SampleBuffer;
use crate::config::AnalysisConfig;
use crate::error::ConfigResult;
use crate::fft::{averaged_windowed_spectrum, locate_analysis_start, AnalysisAnchor, Spectrum};
use crate::fretboard::{FretPosition, Tuning};
use crate::pitch::find_peaks;
use crate::tuning::{calculate_cents_deviation, freq_to_note, midi_to_frequency};

/// A detected frequency and the note it maps to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteMatch {
    pub frequency: f32,
    /// Averaged spectrum magnitude at the bin nearest to `frequency`.
    pub magnitude: f32,
    pub midi: i32,
    pub name: String,
    /// Offset of `frequency` from the note's equal-tempered pitch.
    pub cents: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub note: NoteMatch,
    /// Ascending string order, empty if the note is off the neck.
    pub positions: Vec<FretPosition>,
}

/// Everything produced by one [`Pipeline::analyze`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// `None` for an empty buffer.
    pub anchor: Option<AnalysisAnchor>,
    /// Empty when no window fit inside the buffer.
    pub spectrum: Spectrum,
    /// Strongest first, at most `top_n` entries.
    pub results: Vec<DetectionResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    config: AnalysisConfig,
    tuning: Tuning,
}

impl Pipeline {
    /// Creates a pipeline for standard tuning after validating `config`.
    pub fn new(config: AnalysisConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tuning: Tuning::STANDARD,
        })
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Analyzes a captured buffer at the buffer's own sample rate.
    pub fn analyze(&self, buffer: &SampleBuffer) -> Analysis {
        let config = &self.config;
        let anchor = locate_analysis_start(
            buffer.samples(),
            config.window_size,
            config.hop_size,
            config.num_windows,
            config.pre_offset,
        );
        let spectrum = averaged_windowed_spectrum(
            buffer.samples(),
            buffer.sample_rate(),
            config.window_size,
            config.hop_size,
            config.num_windows,
            config.pre_offset,
            config.window_function,
        );
        let results = detect_from_spectrum(&spectrum, config, &self.tuning);
        Analysis {
            anchor,
            spectrum,
            results,
        }
    }
}

/// Detects notes in `samples` with the given configuration and standard tuning.
///
/// The configuration is not validated; degenerate values simply produce no results.
///
/// # Returns
/// * `Vec<DetectionResult>` - Strongest first, empty when nothing could be analyzed
pub fn detect_notes(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Vec<DetectionResult> {
    let spectrum = averaged_windowed_spectrum(
        samples,
        sample_rate,
        config.window_size,
        config.hop_size,
        config.num_windows,
        config.pre_offset,
        config.window_function,
    );
    detect_from_spectrum(&spectrum, config, &Tuning::STANDARD)
}

fn detect_from_spectrum(
    spectrum: &Spectrum,
    config: &AnalysisConfig,
    tuning: &Tuning,
) -> Vec<DetectionResult> {
    if spectrum.is_empty() {
        log::warn!("Analysis not possible: no {}-sample window fits the signal", config.window_size);
        return Vec::new();
    }

    let peaks = find_peaks(
        spectrum,
        config.min_freq,
        config.max_freq,
        config.threshold,
        config.top_n,
        config.min_peak_distance,
    );

    let results: Vec<DetectionResult> = peaks
        .into_iter()
        .filter_map(|peak| {
            let note = freq_to_note(peak.frequency)?;
            let magnitude = spectrum.magnitude_at(peak.frequency)?;
            let cents = calculate_cents_deviation(peak.frequency, midi_to_frequency(note.midi));
            let positions = tuning.positions(note.midi);
            log::trace!(
                "{} ({:.2} Hz, {:+.1} cents) -> {} positions",
                note.name,
                peak.frequency,
                cents,
                positions.len()
            );
            Some(DetectionResult {
                note: NoteMatch {
                    frequency: peak.frequency,
                    magnitude,
                    midi: note.midi,
                    name: note.name,
                    cents,
                },
                positions,
            })
        })
        .collect();

    log::debug!("Detected {} notes", results.len());
    results
}
