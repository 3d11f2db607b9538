//! Per-note difficulty scoring
//!
//! Reduces the attempt history of each pitch class to a single difficulty in
//! [0, 1] built from four weighted signals:
//! - inaccuracy: share of wrong answers
//! - slowness: average response time above a comfortable baseline
//! - low exposure: too few attempts to trust the other signals
//! - staleness: days since the note was last practised
//!
//! Everything here is recomputed from the history on demand; nothing is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sanitize::{clamp_unit, safe_ratio, sanitize_duration};
use crate::types::{AttemptRecord, PitchClass};

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyWeights {
    pub inaccuracy: f64,
    pub slowness: f64,
    pub low_exposure: f64,
    pub staleness: f64,
    /// Responses faster than this carry no slowness penalty
    pub slow_baseline_ms: f64,
    /// Penalty saturates at baseline + range
    pub slow_range_ms: f64,
    pub exposure_target: u32,
    pub stale_after_days: f64,
    /// Days assumed for a note that was never practised
    pub never_practiced_days: f64,
    pub practice_threshold: f64,
    pub min_attempts: u32,
}

impl Default for DifficultyWeights {
    fn default() -> Self {
        Self {
            inaccuracy: 0.4,
            slowness: 0.3,
            low_exposure: 0.2,
            staleness: 0.1,
            slow_baseline_ms: 3000.0,
            slow_range_ms: 5000.0,
            exposure_target: 5,
            stale_after_days: 7.0,
            never_practiced_days: 30.0,
            practice_threshold: 0.4,
            min_attempts: 3,
        }
    }
}

/// Running totals for one pitch class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteAggregate {
    pub note: PitchClass,
    pub total: u32,
    pub correct: u32,
    pub total_response_ms: f64,
    pub last_practiced: Option<DateTime<Utc>>,
}

impl NoteAggregate {
    pub fn empty(note: PitchClass) -> Self {
        Self {
            note,
            total: 0,
            correct: 0,
            total_response_ms: 0.0,
            last_practiced: None,
        }
    }

    pub fn record(&mut self, attempt: &AttemptRecord) {
        self.total += 1;
        if attempt.correct {
            self.correct += 1;
        }
        self.total_response_ms += sanitize_duration(attempt.response_time_seconds) * 1000.0;
        self.last_practiced = match self.last_practiced {
            Some(last) if last >= attempt.timestamp => Some(last),
            _ => Some(attempt.timestamp),
        };
    }

    pub fn accuracy(&self) -> Option<f64> {
        safe_ratio(self.correct as f64, self.total as f64)
    }

    pub fn avg_response_ms(&self) -> Option<f64> {
        safe_ratio(self.total_response_ms, self.total as f64)
    }

    /// Fractional days since the last attempt; future timestamps count as today.
    pub fn days_since_last_practice(&self, now: DateTime<Utc>, never_practiced_days: f64) -> f64 {
        match self.last_practiced {
            Some(last) => {
                let seconds = (now - last).num_milliseconds() as f64 / 1000.0;
                seconds.max(0.0) / SECONDS_PER_DAY
            }
            None => never_practiced_days,
        }
    }
}

/// Inputs of the difficulty formula for one note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyInputs {
    pub accuracy: Option<f64>,
    pub avg_response_ms: Option<f64>,
    pub total_attempts: u32,
    pub days_since_last_practice: f64,
}

/// Derived view of a note's history. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePerformance {
    pub note: PitchClass,
    /// `None` when the note has no attempts
    pub accuracy: Option<f64>,
    pub avg_response_ms: Option<f64>,
    pub total_attempts: u32,
    pub days_since_last_practice: f64,
    pub difficulty_score: f64,
    pub needs_practice: bool,
}

impl NotePerformance {
    pub fn has_data(&self) -> bool {
        self.total_attempts > 0
    }

    /// Correct answers implied by accuracy and attempts.
    pub fn correct_attempts(&self) -> f64 {
        self.accuracy.unwrap_or(0.0) * self.total_attempts as f64
    }
}

/// Weighted difficulty in [0, 1].
///
/// A note without attempts takes the full inaccuracy weight and no slowness.
pub fn difficulty_score(inputs: &DifficultyInputs, weights: &DifficultyWeights) -> f64 {
    let accuracy = inputs.accuracy.map(clamp_unit).unwrap_or(0.0);
    let inaccuracy = (1.0 - accuracy) * weights.inaccuracy;

    let slowness = match inputs.avg_response_ms {
        Some(avg_ms) => {
            let excess = avg_ms - weights.slow_baseline_ms;
            clamp_unit(safe_ratio(excess, weights.slow_range_ms).unwrap_or(0.0)) * weights.slowness
        }
        None => 0.0,
    };

    let target = weights.exposure_target as f64;
    let missing = target - inputs.total_attempts as f64;
    let low_exposure = clamp_unit(safe_ratio(missing, target).unwrap_or(0.0)) * weights.low_exposure;

    let staleness = clamp_unit(
        safe_ratio(inputs.days_since_last_practice, weights.stale_after_days).unwrap_or(0.0),
    ) * weights.staleness;

    (inaccuracy + slowness + low_exposure + staleness).min(1.0)
}

pub fn needs_practice(score: f64, total_attempts: u32, weights: &DifficultyWeights) -> bool {
    score > weights.practice_threshold || total_attempts < weights.min_attempts
}

/// Group attempts by pitch class. The result is indexed by `PitchClass::index`.
pub fn aggregate_attempts(attempts: &[AttemptRecord]) -> [NoteAggregate; 12] {
    let mut aggregates = PitchClass::ALL.map(NoteAggregate::empty);
    for attempt in attempts {
        aggregates[attempt.note.index() as usize].record(attempt);
    }
    aggregates
}

pub fn score_aggregate(
    aggregate: &NoteAggregate,
    now: DateTime<Utc>,
    weights: &DifficultyWeights,
) -> NotePerformance {
    let inputs = DifficultyInputs {
        accuracy: aggregate.accuracy(),
        avg_response_ms: aggregate.avg_response_ms(),
        total_attempts: aggregate.total,
        days_since_last_practice: aggregate.days_since_last_practice(now, weights.never_practiced_days),
    };
    let score = difficulty_score(&inputs, weights);

    NotePerformance {
        note: aggregate.note,
        accuracy: inputs.accuracy,
        avg_response_ms: inputs.avg_response_ms,
        total_attempts: inputs.total_attempts,
        days_since_last_practice: inputs.days_since_last_practice,
        difficulty_score: score,
        needs_practice: needs_practice(score, inputs.total_attempts, weights),
    }
}

/// Performance of all twelve pitch classes, in chromatic order from C.
pub fn analyze_notes(
    attempts: &[AttemptRecord],
    now: DateTime<Utc>,
    weights: &DifficultyWeights,
) -> Vec<NotePerformance> {
    aggregate_attempts(attempts)
        .iter()
        .map(|aggregate| score_aggregate(aggregate, now, weights))
        .collect()
}

/// Notes flagged for practice, hardest first.
pub fn practice_priorities(performances: &[NotePerformance]) -> Vec<&NotePerformance> {
    let mut flagged: Vec<&NotePerformance> =
        performances.iter().filter(|p| p.needs_practice).collect();
    flagged.sort_by(|a, b| {
        b.difficulty_score
            .total_cmp(&a.difficulty_score)
            .then(a.note.cmp(&b.note))
    });
    flagged
}
