//! # fretboard-core
//!
//! Music-theory and adaptive-practice engine for guitar fretboard training.
//!
//! - **Pitch arithmetic** - the note at any fret, every position of a note
//! - **CAGED transposition** - move the five open-chord shapes to any root
//! - **Difficulty scoring** - one weakness score per pitch class from attempt history
//! - **Quiz sequencing** - adaptive note quizzes drawn from weak, strong and random notes
//! - **Session scoring** - a 0-100 score for a CAGED practice session
//! - **Heatmaps** - shape × note accuracy grid with summaries
//!
//! Storage and rendering belong to the host. Everything here works on
//! snapshots passed in by the caller and returns plain serde-serialisable
//! values.
//!
//! ## Modules
//!
//! - [`pitch`] - tunings, `note_at`, `positions_of`, fretboard map
//! - [`caged`] - shape table, validation, transposition
//! - [`difficulty`] - per-note performance and difficulty
//! - [`quiz`] - sequencer, answer checking, session state machine
//! - [`session_score`] - CAGED session scoring
//! - [`heatmap`] - shape × note aggregation
//! - [`config`] - environment-driven engine configuration
//! - [`logging`] - tracing subscriber setup for hosts
//!
//! ## Example
//!
//! ```rust
//! use fretboard_core::{caged::ShapeTable, note_at, transpose_all, PitchClass, StringTuning};
//!
//! let tuning = StringTuning::standard();
//! assert_eq!(note_at(&tuning, 4, 3).unwrap(), PitchClass::C);
//!
//! let shapes = transpose_all(&ShapeTable::standard(), &tuning, PitchClass::G, 15).unwrap();
//! assert_eq!(shapes.len(), 5);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod error;
pub mod sanitize;
pub mod types;
pub mod pitch;
pub mod caged;
pub mod difficulty;
pub mod quiz;
pub mod session_score;
pub mod heatmap;
pub mod config;
pub mod logging;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{EngineError, EngineResult};

pub use types::*;

pub use pitch::{
    find_fret_for_pitch_on_string, fretboard_map, note_at, positions_of, FretboardCell,
    StringTuning, TuningPreset,
};

pub use caged::{
    transpose_all, transpose_shape, CagedShapeDefinition, ShapeInterval, ShapeTable,
    TransposedPosition, TransposedShape,
};

pub use difficulty::{analyze_notes, practice_priorities, DifficultyWeights, NotePerformance};

pub use quiz::{
    build_quiz, FindAllMissPolicy, QuizMode, QuizPlan, QuizQuestion, QuizSequencer, QuizSession,
    QuizState, SequencerConfig, SkillTier,
};

pub use session_score::{score_session, SessionScoreConfig};

pub use heatmap::{summarize, ColorBucket, Heatmap, HeatmapCell, HeatmapObservation, HeatmapSummary};

pub use config::EngineConfig;
