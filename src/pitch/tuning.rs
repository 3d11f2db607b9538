use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::{PitchClass, STRING_COUNT};

/// Open-string pitches, index 0 = highest-pitched string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<PitchClass>", into = "Vec<PitchClass>")]
pub struct StringTuning {
    strings: [PitchClass; STRING_COUNT],
}

impl StringTuning {
    pub const fn new(strings: [PitchClass; STRING_COUNT]) -> Self {
        Self { strings }
    }

    /// E B G D A E
    pub const fn standard() -> Self {
        Self::new([
            PitchClass::E,
            PitchClass::B,
            PitchClass::G,
            PitchClass::D,
            PitchClass::A,
            PitchClass::E,
        ])
    }

    /// Build from note names, highest string first.
    pub fn from_names(names: &[&str]) -> EngineResult<Self> {
        let pitches = names
            .iter()
            .map(|name| name.parse::<PitchClass>())
            .collect::<EngineResult<Vec<_>>>()?;
        Self::try_from(pitches.as_slice())
    }

    pub fn pitch(&self, string_index: usize) -> EngineResult<PitchClass> {
        self.strings
            .get(string_index)
            .copied()
            .ok_or(EngineError::StringOutOfRange(string_index))
    }

    pub fn strings(&self) -> &[PitchClass; STRING_COUNT] {
        &self.strings
    }
}

impl Default for StringTuning {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<&[PitchClass]> for StringTuning {
    type Error = EngineError;

    fn try_from(value: &[PitchClass]) -> Result<Self, Self::Error> {
        let strings: [PitchClass; STRING_COUNT] = value
            .try_into()
            .map_err(|_| EngineError::InvalidTuningLength(value.len()))?;
        Ok(Self { strings })
    }
}

impl TryFrom<Vec<PitchClass>> for StringTuning {
    type Error = EngineError;

    fn try_from(value: Vec<PitchClass>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl From<StringTuning> for Vec<PitchClass> {
    fn from(value: StringTuning) -> Self {
        value.strings.to_vec()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TuningPreset {
    Standard,
    DropD,
    HalfStepDown,
    OpenG,
    Dadgad,
}

impl TuningPreset {
    pub const ALL: [TuningPreset; 5] = [
        TuningPreset::Standard,
        TuningPreset::DropD,
        TuningPreset::HalfStepDown,
        TuningPreset::OpenG,
        TuningPreset::Dadgad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::DropD => "drop-d",
            Self::HalfStepDown => "half-step-down",
            Self::OpenG => "open-g",
            Self::Dadgad => "dadgad",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == s.trim().to_lowercase())
    }

    pub fn tuning(&self) -> StringTuning {
        use PitchClass::*;
        match self {
            Self::Standard => StringTuning::standard(),
            Self::DropD => StringTuning::new([E, B, G, D, A, D]),
            Self::HalfStepDown => StringTuning::new([DSharp, ASharp, FSharp, CSharp, GSharp, DSharp]),
            Self::OpenG => StringTuning::new([D, B, G, D, G, D]),
            Self::Dadgad => StringTuning::new([D, A, G, D, A, D]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_is_enforced() {
        let five = vec![PitchClass::E; 5];
        assert_eq!(
            StringTuning::try_from(five),
            Err(EngineError::InvalidTuningLength(5))
        );
        let seven = [PitchClass::E; 7];
        assert_eq!(
            StringTuning::try_from(&seven[..]),
            Err(EngineError::InvalidTuningLength(7))
        );
    }

    #[test]
    fn test_from_names() {
        let tuning = StringTuning::from_names(&["E", "B", "G", "D", "A", "E"]).unwrap();
        assert_eq!(tuning, StringTuning::standard());
        assert!(StringTuning::from_names(&["E", "B", "Q", "D", "A", "E"]).is_err());
        assert!(StringTuning::from_names(&["E", "B"]).is_err());
    }

    #[test]
    fn test_presets() {
        assert_eq!(TuningPreset::parse("Drop-D"), Some(TuningPreset::DropD));
        assert_eq!(TuningPreset::DropD.tuning().pitch(5).unwrap(), PitchClass::D);
        assert_eq!(TuningPreset::HalfStepDown.tuning().pitch(0).unwrap(), PitchClass::DSharp);
        assert!(TuningPreset::parse("nashville").is_none());
    }
}
