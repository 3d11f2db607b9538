use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CagedShapeDefinition, ShapeTable};
use crate::error::EngineResult;
use crate::pitch::{find_fret_for_pitch_on_string, note_at, StringTuning};
use crate::types::{FretPosition, IntervalType, PitchClass, ShapeId, PITCH_CLASS_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransposedPosition {
    pub string_index: usize,
    pub fret: u8,
    pub interval_type: IntervalType,
    pub note: PitchClass,
}

impl TransposedPosition {
    pub fn position(&self) -> FretPosition {
        FretPosition::at(self.string_index, self.fret)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransposedShape {
    pub shape: ShapeId,
    pub root: PitchClass,
    pub root_string: usize,
    /// Fret of the anchor root after transposition
    pub root_fret: u8,
    /// Frets the template moved up, in [0, 12)
    pub fret_offset: u8,
    pub positions: Vec<TransposedPosition>,
}

impl TransposedShape {
    /// Lowest and highest fret actually used, if any position survived.
    pub fn fret_span(&self) -> Option<(u8, u8)> {
        let min = self.positions.iter().map(|p| p.fret).min()?;
        let max = self.positions.iter().map(|p| p.fret).max()?;
        Some((min, max))
    }

    pub fn positions_of_type(&self, interval_type: IntervalType) -> impl Iterator<Item = &TransposedPosition> {
        self.positions
            .iter()
            .filter(move |p| p.interval_type == interval_type)
    }
}

/// Move `shape` so that its anchor root sounds `root`.
///
/// The anchor never lands below the template's reference fret, which keeps the
/// offset within one octave. Positions above `max_fret` are dropped.
pub fn transpose_shape(
    shape: &CagedShapeDefinition,
    tuning: &StringTuning,
    root: PitchClass,
    max_fret: u8,
) -> EngineResult<TransposedShape> {
    let anchor = shape.anchor()?;

    let mut root_fret = find_fret_for_pitch_on_string(tuning, anchor.string_index, root, 0)? as u32;
    while root_fret < anchor.reference_fret as u32 {
        root_fret += PITCH_CLASS_COUNT as u32;
    }
    let fret_offset = root_fret - anchor.reference_fret as u32;

    let mut positions = Vec::with_capacity(shape.intervals.len());
    for interval in &shape.intervals {
        let final_fret = interval.reference_fret as u32 + fret_offset;
        if final_fret > max_fret as u32 {
            continue;
        }
        let fret = final_fret as u8;
        positions.push(TransposedPosition {
            string_index: interval.string_index,
            fret,
            interval_type: interval.interval_type,
            note: note_at(tuning, interval.string_index, fret)?,
        });
    }

    debug!(
        shape = %shape.id,
        root = %root,
        root_fret,
        fret_offset,
        kept = positions.len(),
        dropped = shape.intervals.len() - positions.len(),
        "transposed shape"
    );

    Ok(TransposedShape {
        shape: shape.id,
        root,
        root_string: anchor.string_index,
        root_fret: root_fret.min(u8::MAX as u32) as u8,
        fret_offset: fret_offset as u8,
        positions,
    })
}

/// All shapes of `table` for one root, ordered up the neck by lowest fret.
pub fn transpose_all(
    table: &ShapeTable,
    tuning: &StringTuning,
    root: PitchClass,
    max_fret: u8,
) -> EngineResult<Vec<TransposedShape>> {
    let mut shapes = table
        .shapes()
        .iter()
        .map(|shape| transpose_shape(shape, tuning, root, max_fret))
        .collect::<EngineResult<Vec<_>>>()?;

    shapes.sort_by_key(|s| {
        let lowest = s.fret_span().map(|(lo, _)| lo).unwrap_or(s.root_fret);
        (lowest, s.shape.position())
    });
    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_MAX_FRET;

    fn shape(id: ShapeId) -> CagedShapeDefinition {
        ShapeTable::standard().get(id).cloned().unwrap()
    }

    #[test]
    fn test_c_shape_to_g_anchors_on_fret_10() {
        let tuning = StringTuning::standard();
        let result = transpose_shape(&shape(ShapeId::C), &tuning, PitchClass::G, DEFAULT_MAX_FRET).unwrap();

        assert_eq!(result.root_fret, 10);
        assert_eq!(result.fret_offset, 7);
        let anchor = result
            .positions
            .iter()
            .find(|p| p.string_index == 4 && p.interval_type == IntervalType::Root)
            .unwrap();
        assert_eq!(anchor.fret, 10);
        assert_eq!(anchor.note, PitchClass::G);
    }

    #[test]
    fn test_natural_root_is_identity() {
        let tuning = StringTuning::standard();
        let result = transpose_shape(&shape(ShapeId::C), &tuning, PitchClass::C, DEFAULT_MAX_FRET).unwrap();
        assert_eq!(result.fret_offset, 0);
        let frets: Vec<u8> = result.positions.iter().map(|p| p.fret).collect();
        assert_eq!(frets, vec![3, 2, 0, 1, 0]);
    }

    #[test]
    fn test_anchor_never_below_reference() {
        let tuning = StringTuning::standard();
        // A# on the A string is fret 1, below the C shape's reference fret 3
        let result = transpose_shape(&shape(ShapeId::C), &tuning, PitchClass::ASharp, DEFAULT_MAX_FRET).unwrap();
        assert_eq!(result.root_fret, 13);
        assert_eq!(result.fret_offset, 10);
    }

    #[test]
    fn test_high_positions_are_dropped() {
        let tuning = StringTuning::standard();
        let result = transpose_shape(&shape(ShapeId::C), &tuning, PitchClass::B, 12).unwrap();
        // offset 11: frets 14, 13, 11, 12, 11
        assert_eq!(result.positions.len(), 3);
        assert!(result.positions.iter().all(|p| p.fret <= 12));
        assert_eq!(result.fret_span(), Some((11, 12)));
    }

    #[test]
    fn test_chord_tones_follow_root() {
        let tuning = StringTuning::standard();
        let result = transpose_shape(&shape(ShapeId::E), &tuning, PitchClass::A, DEFAULT_MAX_FRET).unwrap();
        for p in &result.positions {
            let expected = PitchClass::A.transpose(p.interval_type.semitones() as i64);
            assert_eq!(p.note, expected);
        }
        assert_eq!(result.positions_of_type(IntervalType::Third).count(), 1);
    }

    #[test]
    fn test_transpose_all_orders_up_the_neck() {
        let tuning = StringTuning::standard();
        let shapes = transpose_all(&ShapeTable::standard(), &tuning, PitchClass::C, DEFAULT_MAX_FRET).unwrap();
        let order: Vec<ShapeId> = shapes.iter().map(|s| s.shape).collect();
        assert_eq!(
            order,
            vec![ShapeId::C, ShapeId::A, ShapeId::G, ShapeId::E, ShapeId::D]
        );
        let lowest: Vec<u8> = shapes.iter().filter_map(|s| s.fret_span()).map(|(lo, _)| lo).collect();
        assert_eq!(lowest, vec![0, 3, 5, 8, 10]);
    }
}
