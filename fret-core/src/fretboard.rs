//! # Fretboard Module
//!
//! Maps a MIDI note onto every string/fret pair of a six-string instrument
//! that can sound it.

use serde::{Deserialize, Serialize};

use crate::tuning::Note;

/// A physical location on the neck. String 1 is the highest-pitched string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FretPosition {
    pub string: u8,
    /// 0 is the open string.
    pub fret: u8,
}

/// Open-string pitches plus the highest playable fret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuning {
    /// MIDI note of each open string, string 1 first.
    pub open_strings: [i32; 6],
    pub max_fret: u8,
}

impl Tuning {
    /// E4 B3 G3 D3 A2 E2, 20 frets.
    pub const STANDARD: Tuning = Tuning {
        open_strings: [64, 59, 55, 50, 45, 40],
        max_fret: 20,
    };

    /// Standard tuning with the low string dropped to D2.
    pub const DROP_D: Tuning = Tuning {
        open_strings: [64, 59, 55, 50, 45, 38],
        max_fret: 20,
    };

    /// Every position that produces `midi`, in ascending string order.
    ///
    /// Empty when the note is below the lowest open string or above the
    /// last fret of every string.
    pub fn positions(&self, midi: i32) -> Vec<FretPosition> {
        self.open_strings
            .iter()
            .zip(1u8..)
            .filter_map(|(&open, string)| {
                let fret = midi.checked_sub(open)?;
                if (0..=self.max_fret as i32).contains(&fret) {
                    Some(FretPosition { string, fret: fret as u8 })
                } else {
                    None
                }
            })
            .collect()
    }

    /// The note sounded at `position`, `None` for a string or fret off the neck.
    pub fn note_at(&self, position: FretPosition) -> Option<Note> {
        if position.fret > self.max_fret {
            return None;
        }
        let index = usize::from(position.string).checked_sub(1)?;
        let open = self.open_strings.get(index)?;
        Some(Note::from_midi(open + i32::from(position.fret)))
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Candidate positions for `midi` in standard tuning.
pub fn estimate_string_and_fret(midi: i32) -> Vec<FretPosition> {
    Tuning::STANDARD.positions(midi)
}
