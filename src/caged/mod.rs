//! CAGED Shape Templates
//!
//! Each of the five open-chord shapes is stored once, at its natural (open)
//! position, as a list of string/fret pairs labelled with the chord tone they
//! carry. [`transposer`] shifts a template so its root lands on any pitch
//! class.
//!
//! A template is only usable when it has exactly one Root interval on its
//! designated root string. That interval is the anchor every transposition is
//! measured from; a table without it is rejected up front.

pub mod transposer;

pub use transposer::{transpose_all, transpose_shape, TransposedPosition, TransposedShape};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::pitch::{note_at, StringTuning};
use crate::types::{IntervalType, PitchClass, ShapeId, STRING_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeInterval {
    pub string_index: usize,
    pub reference_fret: u8,
    pub interval_type: IntervalType,
}

impl ShapeInterval {
    pub const fn new(string_index: usize, reference_fret: u8, interval_type: IntervalType) -> Self {
        Self {
            string_index,
            reference_fret,
            interval_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CagedShapeDefinition {
    pub id: ShapeId,
    pub root_string: usize,
    pub intervals: Vec<ShapeInterval>,
}

impl CagedShapeDefinition {
    /// The single Root interval on the root string.
    pub fn anchor(&self) -> EngineResult<&ShapeInterval> {
        let mut roots = self.intervals.iter().filter(|interval| {
            interval.string_index == self.root_string && interval.interval_type == IntervalType::Root
        });

        let anchor = roots.next().ok_or(EngineError::MissingRootInterval {
            shape: self.id,
            root_string: self.root_string,
        })?;

        if roots.next().is_some() {
            return Err(EngineError::DuplicateRootInterval {
                shape: self.id,
                root_string: self.root_string,
            });
        }

        Ok(anchor)
    }

    /// Root the template plays at its reference position.
    pub fn natural_root(&self, tuning: &StringTuning) -> EngineResult<PitchClass> {
        let anchor = self.anchor()?;
        note_at(tuning, anchor.string_index, anchor.reference_fret)
    }

    /// Structural checks plus interval labels against the pitches they sound.
    pub fn validate(&self, tuning: &StringTuning) -> EngineResult<()> {
        if self.root_string >= STRING_COUNT {
            return Err(EngineError::StringOutOfRange(self.root_string));
        }
        if let Some(bad) = self.intervals.iter().find(|i| i.string_index >= STRING_COUNT) {
            return Err(EngineError::StringOutOfRange(bad.string_index));
        }

        let root = self.natural_root(tuning)?;
        for interval in &self.intervals {
            let expected = root.transpose(interval.interval_type.semitones() as i64);
            let actual = note_at(tuning, interval.string_index, interval.reference_fret)?;
            if expected != actual {
                return Err(EngineError::MislabelledInterval {
                    shape: self.id,
                    string_index: interval.string_index,
                    expected: format!("{} ({})", interval.interval_type.as_str(), expected),
                    actual: actual.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// The five shape templates, in C-A-G-E-D order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeTable {
    shapes: Vec<CagedShapeDefinition>,
}

impl ShapeTable {
    /// Accepts a custom table after validating every template against `tuning`.
    pub fn new(shapes: Vec<CagedShapeDefinition>, tuning: &StringTuning) -> EngineResult<Self> {
        for shape in &shapes {
            shape.validate(tuning)?;
        }
        Ok(Self { shapes })
    }

    /// Open-position major chord templates for standard tuning.
    pub fn standard() -> Self {
        use IntervalType::{Fifth, Root, Third};

        let shapes = vec![
            // x32010
            CagedShapeDefinition {
                id: ShapeId::C,
                root_string: 4,
                intervals: vec![
                    ShapeInterval::new(4, 3, Root),
                    ShapeInterval::new(3, 2, Third),
                    ShapeInterval::new(2, 0, Fifth),
                    ShapeInterval::new(1, 1, Root),
                    ShapeInterval::new(0, 0, Third),
                ],
            },
            // x02220
            CagedShapeDefinition {
                id: ShapeId::A,
                root_string: 4,
                intervals: vec![
                    ShapeInterval::new(4, 0, Root),
                    ShapeInterval::new(3, 2, Fifth),
                    ShapeInterval::new(2, 2, Root),
                    ShapeInterval::new(1, 2, Third),
                    ShapeInterval::new(0, 0, Fifth),
                ],
            },
            // 320003
            CagedShapeDefinition {
                id: ShapeId::G,
                root_string: 5,
                intervals: vec![
                    ShapeInterval::new(5, 3, Root),
                    ShapeInterval::new(4, 2, Third),
                    ShapeInterval::new(3, 0, Fifth),
                    ShapeInterval::new(2, 0, Root),
                    ShapeInterval::new(1, 0, Third),
                    ShapeInterval::new(0, 3, Root),
                ],
            },
            // 022100
            CagedShapeDefinition {
                id: ShapeId::E,
                root_string: 5,
                intervals: vec![
                    ShapeInterval::new(5, 0, Root),
                    ShapeInterval::new(4, 2, Fifth),
                    ShapeInterval::new(3, 2, Root),
                    ShapeInterval::new(2, 1, Third),
                    ShapeInterval::new(1, 0, Fifth),
                    ShapeInterval::new(0, 0, Root),
                ],
            },
            // xx0232
            CagedShapeDefinition {
                id: ShapeId::D,
                root_string: 3,
                intervals: vec![
                    ShapeInterval::new(3, 0, Root),
                    ShapeInterval::new(2, 2, Fifth),
                    ShapeInterval::new(1, 3, Root),
                    ShapeInterval::new(0, 2, Third),
                ],
            },
        ];

        Self { shapes }
    }

    pub fn get(&self, id: ShapeId) -> Option<&CagedShapeDefinition> {
        self.shapes.iter().find(|shape| shape.id == id)
    }

    pub fn shapes(&self) -> &[CagedShapeDefinition] {
        &self.shapes
    }

    pub fn validate(&self, tuning: &StringTuning) -> EngineResult<()> {
        self.shapes.iter().try_for_each(|shape| shape.validate(tuning))
    }
}

impl Default for ShapeTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_valid() {
        let table = ShapeTable::standard();
        assert_eq!(table.shapes().len(), 5);
        assert!(table.validate(&StringTuning::standard()).is_ok());
    }

    #[test]
    fn test_natural_roots_spell_caged() {
        let table = ShapeTable::standard();
        let tuning = StringTuning::standard();
        for id in ShapeId::ALL {
            let shape = table.get(id).unwrap();
            assert_eq!(
                shape.natural_root(&tuning).unwrap().name(),
                id.as_str(),
                "shape {id} should sound its own name in open position"
            );
        }
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let shape = CagedShapeDefinition {
            id: ShapeId::C,
            root_string: 4,
            intervals: vec![ShapeInterval::new(3, 2, IntervalType::Third)],
        };
        assert_eq!(
            shape.anchor(),
            Err(EngineError::MissingRootInterval {
                shape: ShapeId::C,
                root_string: 4
            })
        );
        assert!(ShapeTable::new(vec![shape], &StringTuning::standard()).is_err());
    }

    #[test]
    fn test_duplicate_root_is_rejected() {
        let shape = CagedShapeDefinition {
            id: ShapeId::E,
            root_string: 5,
            intervals: vec![
                ShapeInterval::new(5, 0, IntervalType::Root),
                ShapeInterval::new(5, 12, IntervalType::Root),
            ],
        };
        assert!(matches!(
            shape.anchor(),
            Err(EngineError::DuplicateRootInterval { .. })
        ));
    }

    #[test]
    fn test_mislabelled_interval_is_rejected() {
        let shape = CagedShapeDefinition {
            id: ShapeId::A,
            root_string: 4,
            intervals: vec![
                ShapeInterval::new(4, 0, IntervalType::Root),
                ShapeInterval::new(3, 2, IntervalType::Third),
            ],
        };
        assert!(matches!(
            shape.validate(&StringTuning::standard()),
            Err(EngineError::MislabelledInterval { string_index: 3, .. })
        ));
    }

    #[test]
    fn test_out_of_range_string_is_rejected() {
        let shape = CagedShapeDefinition {
            id: ShapeId::D,
            root_string: 3,
            intervals: vec![
                ShapeInterval::new(3, 0, IntervalType::Root),
                ShapeInterval::new(7, 2, IntervalType::Fifth),
            ],
        };
        assert_eq!(
            shape.validate(&StringTuning::standard()),
            Err(EngineError::StringOutOfRange(7))
        );
    }
}
