//! Common Types and Constants
//!
//! Shared data structures used across the engine modules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ==================== Constants ====================

/// Number of pitch classes in an octave
pub const PITCH_CLASS_COUNT: u8 = 12;

/// Strings on a guitar
pub const STRING_COUNT: usize = 6;

/// Highest fret shown by default in the explorer and transposer
pub const DEFAULT_MAX_FRET: u8 = 15;

// ==================== Pitch Classes ====================

/// One of the twelve equal-tempered note names, octave-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D#")]
    DSharp,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "F#")]
    FSharp,
    #[serde(rename = "G")]
    G,
    #[serde(rename = "G#")]
    GSharp,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A#")]
    ASharp,
    #[serde(rename = "B")]
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Pitch class for any semitone count, reduced mod 12 (C = 0).
    pub fn from_semitone(semitone: i64) -> Self {
        Self::ALL[semitone.rem_euclid(PITCH_CLASS_COUNT as i64) as usize]
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn transpose(self, semitones: i64) -> Self {
        Self::from_semitone(self.index() as i64 + semitones)
    }

    /// Ascending distance from `self` up to `other`, in [0, 12).
    pub fn semitones_to(self, other: PitchClass) -> u8 {
        (other.index() as i64 - self.index() as i64).rem_euclid(PITCH_CLASS_COUNT as i64) as u8
    }

    /// Canonical display name (sharps).
    pub fn name(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::CSharp => "C#",
            Self::D => "D",
            Self::DSharp => "D#",
            Self::E => "E",
            Self::F => "F",
            Self::FSharp => "F#",
            Self::G => "G",
            Self::GSharp => "G#",
            Self::A => "A",
            Self::ASharp => "A#",
            Self::B => "B",
        }
    }

    pub fn flat_name(self) -> &'static str {
        match self {
            Self::CSharp => "Db",
            Self::DSharp => "Eb",
            Self::FSharp => "Gb",
            Self::GSharp => "Ab",
            Self::ASharp => "Bb",
            natural => natural.name(),
        }
    }

    pub fn is_natural(self) -> bool {
        self.name().len() == 1
    }

    /// Parse names like "C", "c#", "Db", "bb". Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.trim().chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let base: i64 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };

        let mut offset = 0i64;
        for c in chars {
            match c {
                '#' | '♯' => offset += 1,
                'b' | '♭' => offset -= 1,
                _ => return None,
            }
        }

        Some(Self::from_semitone(base + offset))
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| EngineError::UnknownNote(s.to_string()))
    }
}

// ==================== Fretboard ====================

/// A single string/fret location. String 0 is the highest-pitched string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FretPosition {
    pub string_index: usize,
    pub fret: u8,
}

impl FretPosition {
    /// Validate a position coming from untyped input (storage, UI events).
    pub fn new(string_index: usize, fret: i64) -> Result<Self, EngineError> {
        if string_index >= STRING_COUNT {
            return Err(EngineError::StringOutOfRange(string_index));
        }
        if fret < 0 {
            return Err(EngineError::NegativeFret(fret));
        }
        let fret = u8::try_from(fret).map_err(|_| EngineError::FretOutOfRange {
            fret: fret.min(u32::MAX as i64) as u32,
            max_fret: u8::MAX,
        })?;
        Ok(Self { string_index, fret })
    }

    pub const fn at(string_index: usize, fret: u8) -> Self {
        Self { string_index, fret }
    }
}

// ==================== CAGED ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeId {
    C,
    A,
    G,
    E,
    D,
}

impl ShapeId {
    /// Canonical CAGED order.
    pub const ALL: [ShapeId; 5] = [ShapeId::C, ShapeId::A, ShapeId::G, ShapeId::E, ShapeId::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::C => "C",
            Self::A => "A",
            Self::G => "G",
            Self::E => "E",
            Self::D => "D",
        }
    }

    pub fn position(&self) -> usize {
        match self {
            Self::C => 0,
            Self::A => 1,
            Self::G => 2,
            Self::E => 3,
            Self::D => 4,
        }
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "C" => Ok(Self::C),
            "A" => Ok(Self::A),
            "G" => Ok(Self::G),
            "E" => Ok(Self::E),
            "D" => Ok(Self::D),
            _ => Err(EngineError::UnknownShape(s.to_string())),
        }
    }
}

/// Chord tone carried by a shape position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalType {
    Root,
    Third,
    Fifth,
}

impl IntervalType {
    /// Semitones above the root for a major triad.
    pub fn semitones(&self) -> u8 {
        match self {
            Self::Root => 0,
            Self::Third => 4,
            Self::Fifth => 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Third => "third",
            Self::Fifth => "fifth",
        }
    }
}

// ==================== History Records ====================

/// One answer given in a note quiz. Created by the quiz, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub note: PitchClass,
    pub correct: bool,
    pub response_time_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

/// A completed CAGED practice session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CagedSessionRecord {
    pub shapes: std::collections::BTreeSet<ShapeId>,
    pub self_accuracy: u8,
    pub elapsed_seconds: f64,
    pub score: f64,
    pub date: DateTime<Utc>,
}
