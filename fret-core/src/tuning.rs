//! # Musical Tuning Module
//!
//! Equal-tempered note mapping with A4 = 440 Hz = MIDI 69.
//!
//! ## Features
//! - Frequency to nearest MIDI note and note name
//! - MIDI note to frequency
//! - Cent deviation for tuning accuracy

use serde::{Deserialize, Serialize};

/// Chromatic pitch class names, indexed by `midi mod 12`.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub const A4_FREQUENCY: f32 = 440.0;
pub const A4_MIDI: i32 = 69;

/// A note on the equal-tempered scale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    /// Pitch class plus MIDI octave, e.g. "A4", "C#3", "B-1".
    pub name: String,
    /// MIDI note number. Not clamped to 0..=127.
    pub midi: i32,
}

impl Note {
    pub fn from_midi(midi: i32) -> Self {
        Self { name: note_name(midi), midi }
    }

    /// Equal-tempered frequency of this note in Hz.
    pub fn frequency(&self) -> f32 {
        midi_to_frequency(self.midi)
    }
}

/// Name of a MIDI note: pitch class followed by the MIDI octave, where
/// octave -1 starts at MIDI 0.
pub fn note_name(midi: i32) -> String {
    let pitch_class = midi.rem_euclid(12) as usize;
    let octave = midi.div_euclid(12) - 1;
    format!("{}{}", NOTE_NAMES[pitch_class], octave)
}

/// Maps a frequency to the nearest equal-tempered note.
///
/// `midi = round(12 * log2(freq / 440) + 69)`, computed in `f64`. Exact
/// half-semitone ties round to the even MIDI number.
///
/// # Arguments
/// * `freq` - Frequency in Hz
///
/// # Returns
/// * `Some(note)` - Nearest note
/// * `None` - `freq` is not a positive, finite number
pub fn freq_to_note(freq: f32) -> Option<Note> {
    if !freq.is_finite() || freq <= 0.0 {
        return None;
    }
    let semitones = 12.0 * (freq as f64 / A4_FREQUENCY as f64).log2();
    let midi = (semitones + A4_MIDI as f64).round_ties_even() as i32;
    Some(Note::from_midi(midi))
}

/// Equal-tempered frequency of a MIDI note in Hz.
pub fn midi_to_frequency(midi: i32) -> f32 {
    A4_FREQUENCY * 2.0_f32.powf((midi - A4_MIDI) as f32 / 12.0)
}

/// Calculates the deviation from a target frequency in cents.
///
/// - 100 cents = 1 semitone
/// - Positive values indicate sharpness, negative values indicate flatness
pub fn calculate_cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}
