//! CAGED practice session scoring.
//!
//! A session is scored out of 100:
//! - accuracy (70): the learner's own 1-5 rating, linear
//! - breadth (20): number of distinct shapes practised, capped at five
//! - pace (10): full marks within one minute per shape, then reduced by the
//!   fraction of overrun

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::sanitize::{clamp_range, clamp_unit, sanitize_duration};
use crate::types::{CagedSessionRecord, ShapeId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionScoreConfig {
    pub accuracy_weight: f64,
    pub breadth_weight: f64,
    pub pace_weight: f64,
    pub seconds_per_shape: f64,
    pub max_self_accuracy: u8,
}

impl Default for SessionScoreConfig {
    fn default() -> Self {
        Self {
            accuracy_weight: 70.0,
            breadth_weight: 20.0,
            pace_weight: 10.0,
            seconds_per_shape: 60.0,
            max_self_accuracy: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionScoreBreakdown {
    pub accuracy: f64,
    pub breadth: f64,
    pub pace: f64,
    pub total: f64,
}

pub fn score_breakdown(
    shape_count: usize,
    self_accuracy: u8,
    elapsed_seconds: f64,
    config: &SessionScoreConfig,
) -> EngineResult<SessionScoreBreakdown> {
    if self_accuracy < 1 || self_accuracy > config.max_self_accuracy {
        return Err(EngineError::InvalidSelfAccuracy(self_accuracy));
    }

    let max_accuracy = config.max_self_accuracy as f64;
    let accuracy = self_accuracy as f64 / max_accuracy * config.accuracy_weight;

    let shapes_covered = shape_count.min(ShapeId::ALL.len()) as f64;
    let breadth = shapes_covered / ShapeId::ALL.len() as f64 * config.breadth_weight;

    let elapsed = sanitize_duration(elapsed_seconds);
    let allowance = config.seconds_per_shape * shape_count.max(1) as f64;
    let pace = if elapsed <= allowance {
        config.pace_weight
    } else {
        let overrun = (elapsed - allowance) / allowance;
        config.pace_weight * (1.0 - clamp_unit(overrun))
    };

    let total = clamp_range(accuracy + breadth + pace, 0.0, 100.0);

    Ok(SessionScoreBreakdown {
        accuracy,
        breadth,
        pace,
        total,
    })
}

/// Score in [0, 100] with the default weights.
pub fn score_session(shape_count: usize, self_accuracy: u8, elapsed_seconds: f64) -> EngineResult<f64> {
    score_breakdown(
        shape_count,
        self_accuracy,
        elapsed_seconds,
        &SessionScoreConfig::default(),
    )
    .map(|b| b.total)
}

impl CagedSessionRecord {
    /// Build a scored record. Fails when `self_accuracy` is outside 1-5.
    pub fn scored(
        shapes: BTreeSet<ShapeId>,
        self_accuracy: u8,
        elapsed_seconds: f64,
        date: DateTime<Utc>,
    ) -> EngineResult<Self> {
        let score = score_session(shapes.len(), self_accuracy, elapsed_seconds)?;
        debug!(shapes = shapes.len(), self_accuracy, score, "scored caged session");
        Ok(Self {
            shapes,
            self_accuracy,
            elapsed_seconds: sanitize_duration(elapsed_seconds),
            score,
            date,
        })
    }
}
