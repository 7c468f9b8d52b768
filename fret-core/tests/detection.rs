//! Integration tests for the detection pipeline
//!
//! These drive the public API with synthetic plucked-string signals.

use fret_core::{
    averaged_spectrum, compute_spectrum, detect_fundamental, detect_multiple_fundamentals,
    estimate_string_and_fret, freq_to_note, AnalysisConfig, FretPosition, Pipeline, SampleBuffer,
};
use std::f32::consts::PI;

const SAMPLE_RATE: u32 = 44100;

/// A decaying tone with harmonics, silent before `onset`.
fn pluck(fundamental: f32, harmonics: &[f32], len: usize, onset: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            if i < onset {
                return 0.0;
            }
            let t = (i - onset) as f32 / SAMPLE_RATE as f32;
            let tone: f32 = harmonics
                .iter()
                .enumerate()
                .map(|(k, amp)| amp * (2.0 * PI * fundamental * (k + 1) as f32 * t).sin())
                .sum();
            (-4.0 * t).exp() * tone
        })
        .collect()
}

#[test_log::test]
fn averaged_pure_sine_stays_within_one_bin() {
    let signal = pluck(196.0, &[1.0], 32768, 4000);
    let spectrum = averaged_spectrum(&signal, SAMPLE_RATE, 4096, 2048, 5, 1024);
    let bin_width = SAMPLE_RATE as f32 / 4096.0;

    let detected = detect_fundamental(&spectrum, 60.0, 1000.0).expect("peak in band");
    assert!((detected - 196.0).abs() <= bin_width, "detected {detected}");
}

#[test_log::test]
fn averaged_spectrum_is_normalized_per_window() {
    let signal = pluck(330.0, &[1.0, 0.5], 32768, 100);
    let spectrum = averaged_spectrum(&signal, SAMPLE_RATE, 4096, 2048, 5, 1024);
    assert_eq!(spectrum.len(), 2048);
    assert!(spectrum.magnitudes().iter().all(|&m| (0.0..=1.0).contains(&m)));
}

#[test_log::test]
fn single_window_spectrum_has_unit_peak() {
    let signal = pluck(247.0, &[1.0, 0.3, 0.2], 4096, 0);
    let spectrum = compute_spectrum(&signal, SAMPLE_RATE);
    let max = spectrum.magnitudes().iter().copied().fold(0.0f32, f32::max);
    assert_eq!(max, 1.0);
}

#[test_log::test]
fn multiple_fundamentals_never_exceed_top_n() {
    let signal = pluck(110.0, &[1.0, 0.8, 0.6, 0.5, 0.4], 32768, 2000);
    let spectrum = averaged_spectrum(&signal, SAMPLE_RATE, 4096, 2048, 5, 1024);
    let band_max = spectrum
        .freqs()
        .iter()
        .zip(spectrum.magnitudes())
        .filter(|&(&f, _)| (60.0..=1000.0).contains(&f))
        .map(|(_, &m)| m)
        .fold(0.0f32, f32::max);

    for top_n in 1..=4 {
        let found = detect_multiple_fundamentals(&spectrum, 60.0, 1000.0, 0.1, top_n);
        assert!(found.len() <= top_n);
        for f in found {
            let magnitude = spectrum.magnitude_at(f).unwrap();
            assert!(magnitude >= 0.1 * band_max);
        }
    }
}

#[test_log::test]
fn pipeline_reports_note_and_positions() -> anyhow::Result<()> {
    let pipeline = Pipeline::new(AnalysisConfig::default())?;
    let buffer = SampleBuffer::new(pluck(164.81, &[1.0, 0.4, 0.2], 44100, 3000), SAMPLE_RATE);
    let analysis = pipeline.analyze(&buffer);

    let anchor = analysis.anchor.expect("non-empty buffer");
    assert_eq!(anchor.start, anchor.peak_index.saturating_sub(1024));

    let strongest = analysis.results.first().expect("a detected note");
    assert_eq!(strongest.note.name, "E3");
    assert_eq!(strongest.positions, estimate_string_and_fret(52));
    assert!(strongest.positions.contains(&FretPosition { string: 4, fret: 2 }));
    Ok(())
}

#[test_log::test]
fn pipeline_is_deterministic() -> anyhow::Result<()> {
    let pipeline = Pipeline::new(AnalysisConfig::default())?;
    let buffer = SampleBuffer::new(pluck(98.0, &[1.0, 0.7, 0.3], 30000, 1500), SAMPLE_RATE);
    assert_eq!(pipeline.analyze(&buffer), pipeline.analyze(&buffer));
    Ok(())
}

#[test_log::test]
fn stereo_capture_is_downmixed() -> anyhow::Result<()> {
    let mono = pluck(220.0, &[1.0], 20000, 500);
    let interleaved: Vec<f32> = mono.iter().flat_map(|&s| [s, s]).collect();
    let buffer = SampleBuffer::from_interleaved(&interleaved, 2, SAMPLE_RATE);
    assert_eq!(buffer.samples(), mono.as_slice());

    let analysis = Pipeline::new(AnalysisConfig::default())?.analyze(&buffer);
    assert_eq!(analysis.results[0].note.name, "A3");
    Ok(())
}

#[test_log::test]
fn results_serialize_to_json() -> anyhow::Result<()> {
    let pipeline = Pipeline::new(AnalysisConfig::default().with_top_n(1))?;
    let buffer = SampleBuffer::new(pluck(110.0, &[1.0], 20000, 0), SAMPLE_RATE);
    let results = pipeline.analyze(&buffer).results;

    let json = serde_json::to_value(&results)?;
    assert_eq!(json[0]["note"]["name"], "A2");
    assert_eq!(json[0]["positions"][0]["string"], 5);
    Ok(())
}

#[test_log::test]
fn note_mapper_sentinels() {
    assert_eq!(freq_to_note(440.0).map(|n| (n.name, n.midi)), Some(("A4".to_string(), 69)));
    assert!(freq_to_note(0.0).is_none());
    assert!(freq_to_note(-5.0).is_none());
    assert!(estimate_string_and_fret(30).is_empty());
}
