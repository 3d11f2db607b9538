use std::time::Duration;

use crate::difficulty::DifficultyWeights;
use crate::pitch::{StringTuning, TuningPreset};
use crate::quiz::{FindAllMissPolicy, SequencerConfig};
use crate::session_score::SessionScoreConfig;
use crate::types::DEFAULT_MAX_FRET;

/// Largest accepted `FRETBOARD_MAX_FRET`.
const FRET_CEILING: u8 = 24;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_fret: u8,
    pub quiz_length: usize,
    pub feedback_delay: Duration,
    pub find_all_miss_policy: FindAllMissPolicy,
    pub tuning: TuningPreset,
    pub log_level: String,
    pub difficulty: DifficultyWeights,
    pub sequencer: SequencerConfig,
    pub session_score: SessionScoreConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_fret: DEFAULT_MAX_FRET,
            quiz_length: 10,
            feedback_delay: Duration::from_millis(1500),
            find_all_miss_policy: FindAllMissPolicy::default(),
            tuning: TuningPreset::Standard,
            log_level: "info".to_string(),
            difficulty: DifficultyWeights::default(),
            sequencer: SequencerConfig::default(),
            session_score: SessionScoreConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `.env` first, then the process environment.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_fret = lookup("FRETBOARD_MAX_FRET")
            .and_then(|value| value.trim().parse::<u8>().ok())
            .filter(|&fret| fret <= FRET_CEILING)
            .unwrap_or(defaults.max_fret);

        let quiz_length = lookup("FRETBOARD_QUIZ_LENGTH")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|&len| len > 0)
            .unwrap_or(defaults.quiz_length);

        let feedback_delay = lookup("FRETBOARD_FEEDBACK_DELAY_MS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.feedback_delay);

        let find_all_miss_policy = lookup("FRETBOARD_FIND_ALL_MISS_POLICY")
            .and_then(|value| FindAllMissPolicy::parse(&value))
            .unwrap_or(defaults.find_all_miss_policy);

        let tuning = lookup("FRETBOARD_TUNING")
            .and_then(|value| TuningPreset::parse(&value))
            .unwrap_or(defaults.tuning);

        let sequencer = SequencerConfig {
            seed: lookup("FRETBOARD_QUIZ_SEED").and_then(|value| value.trim().parse::<u64>().ok()),
            ..defaults.sequencer
        };

        let log_level = lookup("RUST_LOG").unwrap_or(defaults.log_level);

        Self {
            max_fret,
            quiz_length,
            feedback_delay,
            find_all_miss_policy,
            tuning,
            log_level,
            sequencer,
            ..defaults
        }
    }

    pub fn string_tuning(&self) -> StringTuning {
        self.tuning.tuning()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = EngineConfig::from_lookup(|_| None);
        assert_eq!(config.max_fret, 15);
        assert_eq!(config.quiz_length, 10);
        assert_eq!(config.feedback_delay, Duration::from_millis(1500));
        assert_eq!(config.find_all_miss_policy, FindAllMissPolicy::KeepProgress);
        assert_eq!(config.tuning, TuningPreset::Standard);
        assert_eq!(config.log_level, "info");
        assert!(config.sequencer.seed.is_none());
    }

    #[test]
    fn test_reads_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("FRETBOARD_MAX_FRET", "12"),
            ("FRETBOARD_QUIZ_LENGTH", "20"),
            ("FRETBOARD_FEEDBACK_DELAY_MS", "800"),
            ("FRETBOARD_FIND_ALL_MISS_POLICY", "reset"),
            ("FRETBOARD_TUNING", "drop-d"),
            ("FRETBOARD_QUIZ_SEED", "99"),
            ("RUST_LOG", "debug"),
        ]));
        assert_eq!(config.max_fret, 12);
        assert_eq!(config.quiz_length, 20);
        assert_eq!(config.feedback_delay, Duration::from_millis(800));
        assert_eq!(config.find_all_miss_policy, FindAllMissPolicy::ResetProgress);
        assert_eq!(config.string_tuning(), TuningPreset::DropD.tuning());
        assert_eq!(config.sequencer.seed, Some(99));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("FRETBOARD_MAX_FRET", "-3"),
            ("FRETBOARD_QUIZ_LENGTH", "0"),
            ("FRETBOARD_FEEDBACK_DELAY_MS", "soon"),
            ("FRETBOARD_FIND_ALL_MISS_POLICY", "punish"),
        ]));
        assert_eq!(config.max_fret, 15);
        assert_eq!(config.quiz_length, 10);
        assert_eq!(config.feedback_delay, Duration::from_millis(1500));
        assert_eq!(config.find_all_miss_policy, FindAllMissPolicy::KeepProgress);
    }

    #[test]
    fn test_max_fret_above_ceiling_is_ignored() {
        let config = EngineConfig::from_lookup(lookup_from(&[("FRETBOARD_MAX_FRET", "30")]));
        assert_eq!(config.max_fret, 15);
    }
}
