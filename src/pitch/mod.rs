//! Fretboard pitch arithmetic
//!
//! Every fretted position resolves to `(open string pitch + fret) mod 12`.
//! The functions here are total over valid string indices; string indices
//! outside 0..6 are reported as [`EngineError::StringOutOfRange`].

pub mod tuning;

pub use tuning::{StringTuning, TuningPreset};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::{FretPosition, PitchClass, PITCH_CLASS_COUNT, STRING_COUNT};

/// Note sounded at `fret` on `string_index`.
pub fn note_at(tuning: &StringTuning, string_index: usize, fret: u8) -> EngineResult<PitchClass> {
    let open = tuning.pitch(string_index)?;
    Ok(open.transpose(fret as i64))
}

/// All positions in [0, max_fret] that sound `note`, ordered by string then fret.
pub fn positions_of(tuning: &StringTuning, note: PitchClass, max_fret: u8) -> Vec<FretPosition> {
    let mut positions = Vec::new();

    for (string_index, open) in tuning.strings().iter().enumerate() {
        let mut fret = open.semitones_to(note) as u32;
        while fret <= max_fret as u32 {
            positions.push(FretPosition::at(string_index, fret as u8));
            fret += PITCH_CLASS_COUNT as u32;
        }
    }

    positions
}

/// Smallest fret >= `min_fret` on `string_index` that sounds `note`.
///
/// Starts from the direct modular solution and climbs by octaves.
pub fn find_fret_for_pitch_on_string(
    tuning: &StringTuning,
    string_index: usize,
    note: PitchClass,
    min_fret: u8,
) -> EngineResult<u8> {
    let open = tuning.pitch(string_index)?;
    let mut fret = open.semitones_to(note) as u32;
    while fret < min_fret as u32 {
        fret += PITCH_CLASS_COUNT as u32;
    }

    u8::try_from(fret).map_err(|_| EngineError::FretOutOfRange {
        fret,
        max_fret: u8::MAX,
    })
}

/// One cell of the explorer grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FretboardCell {
    pub position: FretPosition,
    pub note: PitchClass,
}

/// The note at every position up to `max_fret`, one row per string.
pub fn fretboard_map(tuning: &StringTuning, max_fret: u8) -> Vec<Vec<FretboardCell>> {
    (0..STRING_COUNT)
        .map(|string_index| {
            let open = tuning.strings()[string_index];
            (0..=max_fret)
                .map(|fret| FretboardCell {
                    position: FretPosition::at(string_index, fret),
                    note: open.transpose(fret as i64),
                })
                .collect()
        })
        .collect()
}
