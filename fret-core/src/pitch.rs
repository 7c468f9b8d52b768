//! # Pitch Detection Module
//!
//! Picks fundamental frequencies out of a normalized [`Spectrum`].
//!
//! ## Features
//! - Strongest-bin detection inside a playable frequency band
//! - Multi-pitch detection with a relative height threshold
//! - Non-maximum suppression so one partial is not reported twice

use crate::config::DEFAULT_MIN_PEAK_DISTANCE;
use crate::fft::{PeakCandidate, Spectrum};

/// Bin indices whose frequency lies inside `[min_freq, max_freq]`.
fn band_bins(spectrum: &Spectrum, min_freq: f32, max_freq: f32) -> Vec<usize> {
    spectrum
        .freqs()
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f >= min_freq && f <= max_freq)
        .map(|(i, _)| i)
        .collect()
}

/// Local maxima of `values`, excluding both ends.
///
/// A flat top counts once, at its middle sample (the left one of the two
/// middles for an even-width plateau).
fn local_maxima(values: &[f32]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if values.len() < 3 {
        return maxima;
    }
    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

/// Detects the dominant frequency inside the band.
///
/// # Arguments
/// * `spectrum` - Normalized magnitude spectrum
/// * `min_freq` - Lowest frequency considered, in Hz (inclusive)
/// * `max_freq` - Highest frequency considered, in Hz (inclusive)
///
/// # Returns
/// * `Some(frequency)` - Frequency of the strongest in-band bin, the lowest one on ties
/// * `None` - No bin lies inside the band
pub fn detect_fundamental(spectrum: &Spectrum, min_freq: f32, max_freq: f32) -> Option<f32> {
    let mut best: Option<(f32, f32)> = None;
    for bin in band_bins(spectrum, min_freq, max_freq) {
        let frequency = spectrum.freqs()[bin];
        let magnitude = spectrum.magnitudes()[bin];
        match best {
            Some((_, best_magnitude)) if magnitude <= best_magnitude => {}
            _ => best = Some((frequency, magnitude)),
        }
    }
    best.map(|(frequency, _)| frequency)
}

/// Finds independent spectral peaks, strongest first.
///
/// # Algorithm
/// 1. Keep only bins inside `[min_freq, max_freq]`
/// 2. Find local maxima of the in-band magnitudes
/// 3. Drop maxima below `threshold * max(in-band magnitudes)`
/// 4. Walking from the strongest peak down, drop any peak closer than
///    `min_distance` bins to one already kept
/// 5. Return at most `top_n` peaks
///
/// A band whose maximum is 0 yields no peaks.
pub fn find_peaks(
    spectrum: &Spectrum,
    min_freq: f32,
    max_freq: f32,
    threshold: f32,
    top_n: usize,
    min_distance: usize,
) -> Vec<PeakCandidate> {
    let bins = band_bins(spectrum, min_freq, max_freq);
    let band: Vec<f32> = bins.iter().map(|&b| spectrum.magnitudes()[b]).collect();

    let band_max = band.iter().copied().fold(0.0f32, f32::max);
    if band_max <= 0.0 || top_n == 0 {
        return Vec::new();
    }
    let height_threshold = threshold * band_max;

    let mut candidates: Vec<usize> = local_maxima(&band)
        .into_iter()
        .filter(|&i| band[i] >= height_threshold)
        .collect();
    // Stable sort: equal heights keep ascending frequency order.
    candidates.sort_by(|&a, &b| band[b].partial_cmp(&band[a]).unwrap_or(std::cmp::Ordering::Equal));

    let mut kept: Vec<usize> = Vec::new();
    for i in candidates {
        let too_close = kept.iter().any(|&k| i.abs_diff(k) < min_distance);
        if !too_close {
            kept.push(i);
            if kept.len() == top_n {
                break;
            }
        }
    }

    log::debug!(
        "Found {} peaks in {:.1}-{:.1} Hz (threshold {:.3})",
        kept.len(),
        min_freq,
        max_freq,
        height_threshold
    );

    kept.into_iter()
        .filter_map(|i| spectrum.peak(bins[i]))
        .inspect(|p| log::trace!("Peak at {:.2} Hz, magnitude {:.3}", p.frequency, p.magnitude))
        .collect()
}

/// Detects up to `top_n` fundamentals, strongest first.
///
/// Peaks must be at least 10 bins apart; see [`find_peaks`] for the policy.
pub fn detect_multiple_fundamentals(
    spectrum: &Spectrum,
    min_freq: f32,
    max_freq: f32,
    threshold: f32,
    top_n: usize,
) -> Vec<f32> {
    find_peaks(spectrum, min_freq, max_freq, threshold, top_n, DEFAULT_MIN_PEAK_DISTANCE)
        .into_iter()
        .map(|p| p.frequency)
        .collect()
}
