//! # Error Types
//!
//! Every fallible operation in the engine returns [`EngineError`]. Most
//! variants describe a malformed tuning or shape table and should surface
//! immediately rather than be recovered from.

use thiserror::Error;

use crate::quiz::session::QuizState;
use crate::types::ShapeId;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A tuning was built from something other than six strings.
    ///
    /// ```
    /// # use fretboard_core::EngineError;
    /// let err = EngineError::InvalidTuningLength(4);
    /// assert_eq!(err.to_string(), "tuning must have exactly 6 strings, got 4");
    /// ```
    #[error("tuning must have exactly 6 strings, got {0}")]
    InvalidTuningLength(usize),

    #[error("string index {0} is out of range (0-5)")]
    StringOutOfRange(usize),

    #[error("fret must be non-negative, got {0}")]
    NegativeFret(i64),

    #[error("fret {fret} exceeds the playable range (max {max_fret})")]
    FretOutOfRange { fret: u32, max_fret: u8 },

    #[error("unknown note name: {0:?}")]
    UnknownNote(String),

    #[error("unknown shape: {0:?}")]
    UnknownShape(String),

    /// A shape template has no Root interval on its designated root string.
    #[error("shape {shape} has no root interval on its root string {root_string}")]
    MissingRootInterval { shape: ShapeId, root_string: usize },

    #[error("shape {shape} has more than one root interval on its root string {root_string}")]
    DuplicateRootInterval { shape: ShapeId, root_string: usize },

    /// An interval label disagrees with the pitch it actually produces.
    #[error("shape {shape}: interval on string {string_index} is labelled {expected} but sounds {actual}")]
    MislabelledInterval {
        shape: ShapeId,
        string_index: usize,
        expected: String,
        actual: String,
    },

    #[error("self-rated accuracy must be between 1 and 5, got {0}")]
    InvalidSelfAccuracy(u8),

    #[error("question {0} is already closed")]
    QuestionClosed(usize),

    #[error("invalid quiz transition from {from:?} on {event}")]
    InvalidTransition { from: QuizState, event: String },
}
