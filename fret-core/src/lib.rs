// fret-core/src/lib.rs

//! The core logic for the guitar note detector.
//! This crate turns a captured buffer of samples into a ranked list of
//! detected notes and the string/fret positions that could have played them.
//! It performs no I/O and contains no capture or GUI code.

pub mod audio;
pub mod config;
pub mod error;
pub mod fft;
pub mod fretboard;
pub mod pipeline;
pub mod pitch;
pub mod tuning;

pub use audio::SampleBuffer;
pub use config::AnalysisConfig;
pub use error::{ConfigError, ConfigResult};
pub use fft::{averaged_spectrum, compute_spectrum, PeakCandidate, Spectrum, WindowFunction};
pub use fretboard::{estimate_string_and_fret, FretPosition, Tuning};
pub use pipeline::{detect_notes, Analysis, DetectionResult, NoteMatch, Pipeline};
pub use pitch::{detect_fundamental, detect_multiple_fundamentals};
pub use tuning::{freq_to_note, Note};
