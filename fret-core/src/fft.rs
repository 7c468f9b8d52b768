//! # Fast Fourier Transform (FFT) Module
//!
//! Turns time-domain sample windows into normalized magnitude spectra.
//!
//! ## Features
//! - Single-window spectrum using RustFFT
//! - Optional Hann windowing for reduced spectral leakage
//! - Attack-anchored averaging over several overlapping windows
//!
//! Every magnitude sequence is scaled so its largest bin is exactly `1.0`.
//! A silent window produces all zeros instead.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::{Deserialize, Serialize};

/// Taper applied to a window before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowFunction {
    /// No taper: the raw DFT of the window.
    #[default]
    Rectangular,
    Hann,
}

/// Positive-frequency half of a transform.
///
/// `freqs` and `magnitudes` always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    freqs: Vec<f32>,
    magnitudes: Vec<f32>,
}

/// One bin of a [`Spectrum`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakCandidate {
    pub bin: usize,
    pub frequency: f32,
    pub magnitude: f32,
}

/// Where the averaged analysis starts inside a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisAnchor {
    /// Index of the sample with the largest absolute amplitude.
    pub peak_index: usize,
    /// First sample of the first analysis window.
    pub start: usize,
}

impl Spectrum {
    /// Pairs a frequency axis with its magnitudes.
    ///
    /// If the lengths differ, both are cut to the shorter one.
    pub fn new(mut freqs: Vec<f32>, mut magnitudes: Vec<f32>) -> Self {
        let len = freqs.len().min(magnitudes.len());
        freqs.truncate(len);
        magnitudes.truncate(len);
        Self { freqs, magnitudes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn freqs(&self) -> &[f32] {
        &self.freqs
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }

    /// Spacing between adjacent bins, `None` with fewer than two bins.
    pub fn bin_width(&self) -> Option<f32> {
        match self.freqs.as_slice() {
            [first, second, ..] => Some(second - first),
            _ => None,
        }
    }

    /// Index of the bin closest to `freq`. The lower bin wins a tie.
    pub fn nearest_bin(&self, freq: f32) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &f) in self.freqs.iter().enumerate() {
            let distance = (f - freq).abs();
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((i, distance)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Magnitude of the bin closest to `freq`.
    pub fn magnitude_at(&self, freq: f32) -> Option<f32> {
        self.nearest_bin(freq).map(|i| self.magnitudes[i])
    }

    pub fn peak(&self, bin: usize) -> Option<PeakCandidate> {
        Some(PeakCandidate {
            bin,
            frequency: *self.freqs.get(bin)?,
            magnitude: *self.magnitudes.get(bin)?,
        })
    }
}

/// Applies a Hann window to the input buffer to reduce spectral leakage.
fn apply_hann_window(buffer: &mut [f32]) {
    let n = buffer.len();
    if n < 2 {
        return;
    }
    let n_minus_1 = (n - 1) as f32;
    for (i, sample) in buffer.iter_mut().enumerate() {
        let multiplier = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos());
        *sample *= multiplier;
    }
}

/// Scales `magnitudes` so the largest is 1.0, or zeroes them when all are 0.
fn normalize(magnitudes: &mut [f32]) {
    let max = magnitudes.iter().copied().fold(0.0f32, f32::max);
    if max > 0.0 {
        for m in magnitudes.iter_mut() {
            *m /= max;
        }
    } else {
        magnitudes.fill(0.0);
    }
}

fn spectrum_with_plan(
    samples: &[f32],
    sample_rate: u32,
    window_function: WindowFunction,
    fft: &dyn Fft<f32>,
) -> Spectrum {
    let n = samples.len();
    let mut processed = samples.to_vec();
    if window_function == WindowFunction::Hann {
        apply_hann_window(&mut processed);
    }

    let mut buffer: Vec<Complex<f32>> = processed
        .into_iter()
        .map(|sample| Complex { re: sample, im: 0.0 })
        .collect();
    fft.process(&mut buffer);

    let half = n / 2;
    let freqs = (0..half)
        .map(|i| i as f32 * sample_rate as f32 / n as f32)
        .collect();
    let mut magnitudes: Vec<f32> = buffer
        .iter()
        .take(half)
        .map(|c| c.norm()) // .norm() is sqrt(re^2 + im^2)
        .collect();
    normalize(&mut magnitudes);

    Spectrum { freqs, magnitudes }
}

/// Computes the normalized positive-frequency spectrum of one window.
///
/// The transform covers the whole slice; any length works, powers of two
/// are fastest. Bin `i` sits at `i * sample_rate / n` Hz and only the first
/// `n / 2` bins are kept.
///
/// # Arguments
/// * `samples` - The window to transform
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
/// * `Spectrum` - `n / 2` bins, empty when `n < 2`
pub fn compute_spectrum(samples: &[f32], sample_rate: u32) -> Spectrum {
    compute_windowed_spectrum(samples, sample_rate, WindowFunction::Rectangular)
}

/// Same as [`compute_spectrum`], with a taper applied before the transform.
pub fn compute_windowed_spectrum(
    samples: &[f32],
    sample_rate: u32,
    window_function: WindowFunction,
) -> Spectrum {
    if samples.is_empty() {
        return Spectrum::empty();
    }
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(samples.len());
    spectrum_with_plan(samples, sample_rate, window_function, fft.as_ref())
}

/// Finds where a peak-anchored analysis should begin.
///
/// 1. The anchor is the sample with the largest absolute value (first one on ties).
/// 2. The start is `pre_offset` samples before it, clamped at 0.
/// 3. If `num_windows * hop_size + window_size` samples do not fit from there,
///    the start moves left until they do (or to 0).
///
/// # Returns
/// * `Some(anchor)` - Peak index and window start
/// * `None` - The signal is empty
pub fn locate_analysis_start(
    signal: &[f32],
    window_size: usize,
    hop_size: usize,
    num_windows: usize,
    pre_offset: usize,
) -> Option<AnalysisAnchor> {
    let mut peak: Option<(usize, f32)> = None;
    for (i, sample) in signal.iter().enumerate() {
        let amplitude = sample.abs();
        match peak {
            Some((_, best)) if amplitude <= best => {}
            _ => peak = Some((i, amplitude)),
        }
    }
    let (peak_index, _) = peak?;

    let span = num_windows
        .saturating_mul(hop_size)
        .saturating_add(window_size);
    let mut start = peak_index.saturating_sub(pre_offset);
    if start.saturating_add(span) > signal.len() {
        start = signal.len().saturating_sub(span);
    }

    Some(AnalysisAnchor { peak_index, start })
}

/// Averages the spectra of several overlapping windows anchored on the attack.
///
/// Window `i` covers `[start + i * hop_size, start + i * hop_size + window_size)`
/// with `start` from [`locate_analysis_start`]. Windows that would run past the
/// end of the signal are not computed. Magnitudes are the element-wise mean.
///
/// # Returns
/// * `Spectrum` - `window_size / 2` bins, or empty if no window fits
pub fn averaged_spectrum(
    signal: &[f32],
    sample_rate: u32,
    window_size: usize,
    hop_size: usize,
    num_windows: usize,
    pre_offset: usize,
) -> Spectrum {
    averaged_windowed_spectrum(
        signal,
        sample_rate,
        window_size,
        hop_size,
        num_windows,
        pre_offset,
        WindowFunction::Rectangular,
    )
}

/// [`averaged_spectrum`] with a configurable taper per window.
pub fn averaged_windowed_spectrum(
    signal: &[f32],
    sample_rate: u32,
    window_size: usize,
    hop_size: usize,
    num_windows: usize,
    pre_offset: usize,
    window_function: WindowFunction,
) -> Spectrum {
    if window_size == 0 || num_windows == 0 {
        return Spectrum::empty();
    }
    let Some(anchor) = locate_analysis_start(signal, window_size, hop_size, num_windows, pre_offset)
    else {
        return Spectrum::empty();
    };

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(window_size);

    let mut sum: Vec<f32> = Vec::new();
    let mut freqs: Vec<f32> = Vec::new();
    let mut count = 0usize;

    for i in 0..num_windows {
        let begin = anchor.start.saturating_add(i.saturating_mul(hop_size));
        let end = begin.saturating_add(window_size);
        if end > signal.len() {
            break;
        }
        let spectrum = spectrum_with_plan(&signal[begin..end], sample_rate, window_function, fft.as_ref());
        if sum.is_empty() {
            sum = vec![0.0; spectrum.magnitudes.len()];
        }
        for (acc, m) in sum.iter_mut().zip(&spectrum.magnitudes) {
            *acc += m;
        }
        freqs = spectrum.freqs;
        count += 1;
    }

    log::debug!(
        "Averaged {} of {} windows (size {}, hop {}) from start {} (peak at {})",
        count,
        num_windows,
        window_size,
        hop_size,
        anchor.start,
        anchor.peak_index
    );

    if count == 0 {
        return Spectrum::empty();
    }
    for acc in sum.iter_mut() {
        *acc /= count as f32;
    }
    Spectrum { freqs, magnitudes: sum }
}
