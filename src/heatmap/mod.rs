//! Shape × note performance heatmap
//!
//! Always emits the full 5 × 12 grid. Cells with no attempts are reported
//! as [`ColorBucket::NoData`] with `accuracy: None`, never as 0%.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sanitize::safe_ratio;
use crate::types::{CagedSessionRecord, PitchClass, ShapeId};

pub const HEATMAP_CELL_COUNT: usize = ShapeId::ALL.len() * PitchClass::ALL.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapObservation {
    pub shape: ShapeId,
    pub note: PitchClass,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorBucket {
    NoData,
    /// Below 40%
    Poor,
    /// 40-59%
    Fair,
    /// 60-79%
    Good,
    /// 80% and above
    Excellent,
}

impl ColorBucket {
    pub fn from_accuracy(accuracy: Option<f64>) -> Self {
        match accuracy {
            None => Self::NoData,
            Some(a) if a < 0.4 => Self::Poor,
            Some(a) if a < 0.6 => Self::Fair,
            Some(a) if a < 0.8 => Self::Good,
            Some(_) => Self::Excellent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoData => "no-data",
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub shape: ShapeId,
    pub note: PitchClass,
    pub attempts: u32,
    pub correct: u32,
    pub accuracy: Option<f64>,
    pub color_bucket: ColorBucket,
}

impl HeatmapCell {
    fn empty(shape: ShapeId, note: PitchClass) -> Self {
        Self {
            shape,
            note,
            attempts: 0,
            correct: 0,
            accuracy: None,
            color_bucket: ColorBucket::NoData,
        }
    }

    fn finish(&mut self) {
        self.accuracy = safe_ratio(self.correct as f64, self.attempts as f64);
        self.color_bucket = ColorBucket::from_accuracy(self.accuracy);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heatmap {
    cells: Vec<HeatmapCell>,
}

impl Heatmap {
    pub fn build(observations: &[HeatmapObservation]) -> Self {
        let mut cells: Vec<HeatmapCell> = ShapeId::ALL
            .iter()
            .flat_map(|&shape| PitchClass::ALL.iter().map(move |&note| HeatmapCell::empty(shape, note)))
            .collect();

        for obs in observations {
            let cell = &mut cells[cell_index(obs.shape, obs.note)];
            cell.attempts += 1;
            if obs.correct {
                cell.correct += 1;
            }
        }
        cells.iter_mut().for_each(HeatmapCell::finish);

        debug!(observations = observations.len(), "built heatmap");

        Self { cells }
    }

    /// All 60 cells, shape-major in CAGED order.
    pub fn cells(&self) -> &[HeatmapCell] {
        &self.cells
    }

    pub fn cell(&self, shape: ShapeId, note: PitchClass) -> &HeatmapCell {
        &self.cells[cell_index(shape, note)]
    }

    /// The twelve cells of one shape.
    pub fn row(&self, shape: ShapeId) -> &[HeatmapCell] {
        let start = shape.position() * PitchClass::ALL.len();
        &self.cells[start..start + PitchClass::ALL.len()]
    }

    pub fn total_attempts(&self) -> u32 {
        self.cells.iter().map(|c| c.attempts).sum()
    }

    pub fn shape_totals(&self, shape: ShapeId) -> Tally {
        self.row(shape).iter().fold(Tally::default(), |t, c| t.add(c))
    }

    pub fn note_totals(&self, note: PitchClass) -> Tally {
        ShapeId::ALL
            .iter()
            .map(|&shape| self.cell(shape, note))
            .fold(Tally::default(), |t, c| t.add(c))
    }
}

fn cell_index(shape: ShapeId, note: PitchClass) -> usize {
    shape.position() * PitchClass::ALL.len() + note.index() as usize
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub attempts: u32,
    pub correct: u32,
}

impl Tally {
    fn add(self, cell: &HeatmapCell) -> Self {
        Self {
            attempts: self.attempts + cell.attempts,
            correct: self.correct + cell.correct,
        }
    }

    pub fn accuracy(&self) -> Option<f64> {
        safe_ratio(self.correct as f64, self.attempts as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapSummary {
    pub strongest_shape: Option<ShapeId>,
    pub weakest_shape: Option<ShapeId>,
    pub strongest_note: Option<PitchClass>,
    pub weakest_note: Option<PitchClass>,
    pub average_score: Option<f64>,
    pub session_count: usize,
}

/// Best and worst by accuracy. Ties go to the key with more attempts, then
/// to the one listed first.
fn extremes<K: Copy>(ranked: impl Iterator<Item = (K, Tally)>) -> (Option<K>, Option<K>) {
    let mut best: Option<(K, f64, u32)> = None;
    let mut worst: Option<(K, f64, u32)> = None;

    for (key, tally) in ranked {
        let Some(acc) = tally.accuracy() else {
            continue;
        };
        let candidate = (key, acc, tally.attempts);

        let beats_best = match best {
            None => true,
            Some((_, b, n)) => acc > b || (acc == b && tally.attempts > n),
        };
        if beats_best {
            best = Some(candidate);
        }

        let beats_worst = match worst {
            None => true,
            Some((_, w, n)) => acc < w || (acc == w && tally.attempts > n),
        };
        if beats_worst {
            worst = Some(candidate);
        }
    }

    (best.map(|b| b.0), worst.map(|w| w.0))
}

pub fn summarize(heatmap: &Heatmap, sessions: &[CagedSessionRecord]) -> HeatmapSummary {
    let (strongest_shape, weakest_shape) =
        extremes(ShapeId::ALL.iter().map(|&s| (s, heatmap.shape_totals(s))));
    let (strongest_note, weakest_note) =
        extremes(PitchClass::ALL.iter().map(|&n| (n, heatmap.note_totals(n))));

    let scores: Vec<f64> = sessions.iter().map(|s| s.score).filter(|s| s.is_finite()).collect();
    let average_score = safe_ratio(scores.iter().sum(), scores.len() as f64);

    HeatmapSummary {
        strongest_shape,
        weakest_shape,
        strongest_note,
        weakest_note,
        average_score,
        session_count: sessions.len(),
    }
}
