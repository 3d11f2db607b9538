//! Adaptive note-finding quizzes
//!
//! Questions are drawn from three pools:
//! - priority: notes flagged for practice, hardest first
//! - maintenance: notes already known well, to keep them fresh
//! - random: any of the twelve pitch classes
//!
//! The composed list is shuffled so the learner cannot tell which pool a
//! question came from. The learner's skill tier decides the fret range and
//! which question modes are allowed.

pub mod answer;
pub mod session;

pub use answer::{ClickVerdict, FindAllMissPolicy, QuestionProgress};
pub use session::{next_state, QuizEvent, QuizSession, QuizState, QuizSummary};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::difficulty::{practice_priorities, NotePerformance};
use crate::pitch::{positions_of, StringTuning};
use crate::sanitize::safe_ratio;
use crate::types::{FretPosition, PitchClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizMode {
    /// Click the note anywhere on the neck
    FindAny,
    /// Click every occurrence of the note within the fret range
    FindAll,
    /// Click the note on one given string
    FindOnString,
}

impl QuizMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FindAny => "find-any",
            Self::FindAll => "find-all",
            Self::FindOnString => "find-on-string",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillTier {
    pub fn classify(total_attempts: u32, avg_accuracy: Option<f64>) -> Self {
        let accuracy = avg_accuracy.unwrap_or(0.0);
        if total_attempts < 50 || accuracy < 0.6 {
            Self::Beginner
        } else if total_attempts < 200 || accuracy < 0.8 {
            Self::Intermediate
        } else {
            Self::Advanced
        }
    }

    /// Tier from per-note performance, using attempt-weighted accuracy.
    pub fn from_performances(performances: &[NotePerformance]) -> Self {
        let total: u32 = performances.iter().map(|p| p.total_attempts).sum();
        let correct: f64 = performances.iter().map(|p| p.correct_attempts()).sum();
        Self::classify(total, safe_ratio(correct, total as f64))
    }

    pub fn max_fret(&self) -> u8 {
        match self {
            Self::Beginner => 5,
            Self::Intermediate => 12,
            Self::Advanced => 15,
        }
    }

    pub fn modes(&self) -> &'static [QuizMode] {
        match self {
            Self::Beginner => &[QuizMode::FindAny],
            Self::Intermediate => &[QuizMode::FindAny, QuizMode::FindOnString],
            Self::Advanced => &[QuizMode::FindAny, QuizMode::FindAll, QuizMode::FindOnString],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub index: usize,
    pub note: PitchClass,
    pub mode: QuizMode,
    /// Only set for find-on-string
    pub target_string: Option<usize>,
    pub max_fret: u8,
}

impl QuizQuestion {
    /// Positions that answer the question correctly.
    pub fn targets(&self, tuning: &StringTuning) -> Vec<FretPosition> {
        let positions = positions_of(tuning, self.note, self.max_fret);
        match (self.mode, self.target_string) {
            (QuizMode::FindOnString, Some(string)) => positions
                .into_iter()
                .filter(|p| p.string_index == string)
                .collect(),
            _ => positions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPlan {
    pub tier: SkillTier,
    pub max_fret: u8,
    pub questions: Vec<QuizQuestion>,
}

impl QuizPlan {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn notes(&self) -> Vec<PitchClass> {
        self.questions.iter().map(|q| q.note).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequencerConfig {
    pub priority_ratio: f64,
    pub maintenance_ratio: f64,
    pub priority_pool_size: usize,
    pub maintenance_pool_size: usize,
    pub maintenance_min_accuracy: f64,
    pub maintenance_min_attempts: u32,
    /// Fixed seed for reproducible quizzes
    pub seed: Option<u64>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            priority_ratio: 0.7,
            maintenance_ratio: 0.2,
            priority_pool_size: 6,
            maintenance_pool_size: 3,
            maintenance_min_accuracy: 0.7,
            maintenance_min_attempts: 5,
            seed: None,
        }
    }
}

/// Up to `size` notes needing practice, hardest first.
pub fn priority_pool(performances: &[NotePerformance], size: usize) -> Vec<PitchClass> {
    practice_priorities(performances)
        .into_iter()
        .take(size)
        .map(|p| p.note)
        .collect()
}

/// Up to `maintenance_pool_size` well-known notes, most accurate first.
pub fn maintenance_pool(performances: &[NotePerformance], config: &SequencerConfig) -> Vec<PitchClass> {
    let mut candidates: Vec<(&NotePerformance, f64)> = performances
        .iter()
        .filter(|p| !p.needs_practice && p.total_attempts >= config.maintenance_min_attempts)
        .filter_map(|p| p.accuracy.map(|acc| (p, acc)))
        .filter(|(_, acc)| *acc > config.maintenance_min_accuracy)
        .collect();

    candidates.sort_by(|(a, acc_a), (b, acc_b)| {
        acc_b
            .total_cmp(acc_a)
            .then(b.total_attempts.cmp(&a.total_attempts))
            .then(a.note.cmp(&b.note))
    });

    candidates
        .into_iter()
        .take(config.maintenance_pool_size)
        .map(|(p, _)| p.note)
        .collect()
}

fn slot_count(count: usize, ratio: f64) -> usize {
    ((count as f64 * ratio.clamp(0.0, 1.0)) + 1e-9).floor() as usize
}

fn random_note<R: Rng>(rng: &mut R) -> PitchClass {
    PitchClass::ALL[rng.random_range(0..PitchClass::ALL.len())]
}

/// Compose `count` notes from the three pools and shuffle them.
///
/// Pools that are empty hand their slots to the random pool.
pub fn compose_notes<R: Rng>(
    performances: &[NotePerformance],
    count: usize,
    config: &SequencerConfig,
    rng: &mut R,
) -> Vec<PitchClass> {
    let priority = priority_pool(performances, config.priority_pool_size);
    let maintenance = maintenance_pool(performances, config);

    let priority_slots = if priority.is_empty() {
        0
    } else {
        slot_count(count, config.priority_ratio).min(count)
    };
    let maintenance_slots = if maintenance.is_empty() {
        0
    } else {
        slot_count(count, config.maintenance_ratio).min(count - priority_slots)
    };
    let random_slots = count - priority_slots - maintenance_slots;

    debug!(
        count,
        priority_pool = priority.len(),
        maintenance_pool = maintenance.len(),
        priority_slots,
        maintenance_slots,
        random_slots,
        "composing quiz notes"
    );

    let mut notes = Vec::with_capacity(count);
    notes.extend((0..priority_slots).map(|i| priority[i % priority.len()]));
    notes.extend((0..maintenance_slots).map(|i| maintenance[i % maintenance.len()]));
    for _ in 0..random_slots {
        notes.push(random_note(rng));
    }

    notes.shuffle(rng);
    notes
}

fn pick_mode<R: Rng>(tier: SkillTier, rng: &mut R) -> QuizMode {
    let modes = tier.modes();
    modes[rng.random_range(0..modes.len())]
}

/// Strings holding at least one occurrence of `note` within `max_fret`.
pub fn playable_strings(tuning: &StringTuning, note: PitchClass, max_fret: u8) -> Vec<usize> {
    let mut strings: Vec<usize> = positions_of(tuning, note, max_fret)
        .into_iter()
        .map(|p| p.string_index)
        .collect();
    strings.dedup();
    strings
}

/// Build a full quiz for the learner described by `performances`.
pub fn build_quiz<R: Rng>(
    performances: &[NotePerformance],
    tuning: &StringTuning,
    count: usize,
    config: &SequencerConfig,
    rng: &mut R,
) -> QuizPlan {
    let tier = SkillTier::from_performances(performances);
    let max_fret = tier.max_fret();
    let notes = compose_notes(performances, count, config, rng);

    let questions = notes
        .into_iter()
        .enumerate()
        .map(|(index, note)| {
            let mut mode = pick_mode(tier, rng);
            let mut target_string = None;

            if mode == QuizMode::FindOnString {
                let strings = playable_strings(tuning, note, max_fret);
                if strings.is_empty() {
                    debug!(%note, max_fret, "no playable string, falling back to find-any");
                    mode = QuizMode::FindAny;
                } else {
                    target_string = Some(strings[rng.random_range(0..strings.len())]);
                }
            }

            QuizQuestion {
                index,
                note,
                mode,
                target_string,
                max_fret,
            }
        })
        .collect();

    debug!(tier = tier.as_str(), max_fret, count, "built quiz");

    QuizPlan {
        tier,
        max_fret,
        questions,
    }
}

/// Owns a random source so hosts can keep one sequencer per learner session.
pub struct QuizSequencer {
    config: SequencerConfig,
    rng: ChaCha8Rng,
}

impl QuizSequencer {
    pub fn new(config: SequencerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn generate(
        &mut self,
        performances: &[NotePerformance],
        tuning: &StringTuning,
        count: usize,
    ) -> QuizPlan {
        build_quiz(performances, tuning, count, &self.config, &mut self.rng)
    }
}

impl Default for QuizSequencer {
    fn default() -> Self {
        Self::new(SequencerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perf(note: PitchClass, accuracy: Option<f64>, total: u32, score: f64, needs: bool) -> NotePerformance {
        NotePerformance {
            note,
            accuracy,
            avg_response_ms: accuracy.map(|_| 2000.0),
            total_attempts: total,
            days_since_last_practice: 1.0,
            difficulty_score: score,
            needs_practice: needs,
        }
    }

    fn seeded() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_tier_classification() {
        assert_eq!(SkillTier::classify(10, Some(1.0)), SkillTier::Beginner);
        assert_eq!(SkillTier::classify(500, Some(0.5)), SkillTier::Beginner);
        assert_eq!(SkillTier::classify(100, Some(0.9)), SkillTier::Intermediate);
        assert_eq!(SkillTier::classify(500, Some(0.7)), SkillTier::Intermediate);
        assert_eq!(SkillTier::classify(500, Some(0.85)), SkillTier::Advanced);
        assert_eq!(SkillTier::classify(0, None), SkillTier::Beginner);
    }

    #[test]
    fn test_tier_from_weighted_accuracy() {
        let performances = vec![
            perf(PitchClass::C, Some(1.0), 150, 0.0, false),
            perf(PitchClass::D, Some(0.5), 100, 0.3, false),
        ];
        // 200 correct of 250 -> 0.8
        assert_eq!(SkillTier::from_performances(&performances), SkillTier::Advanced);
    }

    #[test]
    fn test_priority_pool_top_six() {
        let performances: Vec<NotePerformance> = PitchClass::ALL
            .iter()
            .enumerate()
            .map(|(i, &note)| perf(note, Some(0.2), 10, 0.4 + i as f64 * 0.01, true))
            .collect();
        let pool = priority_pool(&performances, 6);
        assert_eq!(pool.len(), 6);
        assert_eq!(pool[0], PitchClass::B);
        assert_eq!(pool[5], PitchClass::FSharp);
    }

    #[test]
    fn test_maintenance_pool_filters() {
        let performances = vec![
            perf(PitchClass::C, Some(0.95), 20, 0.05, false),
            perf(PitchClass::D, Some(0.9), 4, 0.1, false),
            perf(PitchClass::E, Some(0.7), 20, 0.2, false),
            perf(PitchClass::F, Some(0.99), 20, 0.5, true),
            perf(PitchClass::G, Some(0.8), 30, 0.1, false),
        ];
        let pool = maintenance_pool(&performances, &SequencerConfig::default());
        assert_eq!(pool, vec![PitchClass::C, PitchClass::G]);
    }

    #[test]
    fn test_composition_ratios() {
        let performances = vec![
            perf(PitchClass::F, Some(0.2), 10, 0.8, true),
            perf(PitchClass::C, Some(0.95), 20, 0.05, false),
        ];
        let notes = compose_notes(&performances, 10, &SequencerConfig::default(), &mut seeded());
        assert_eq!(notes.len(), 10);
        assert!(notes.iter().filter(|&&n| n == PitchClass::F).count() >= 7);
        assert!(notes.iter().filter(|&&n| n == PitchClass::C).count() >= 2);
    }

    #[test]
    fn test_empty_pools_fall_back_to_random() {
        let notes = compose_notes(&[], 9, &SequencerConfig::default(), &mut seeded());
        assert_eq!(notes.len(), 9);
    }

    #[test]
    fn test_beginner_quiz_uses_find_any_and_low_frets() {
        let plan = build_quiz(
            &[],
            &StringTuning::standard(),
            12,
            &SequencerConfig::default(),
            &mut seeded(),
        );
        assert_eq!(plan.tier, SkillTier::Beginner);
        assert_eq!(plan.len(), 12);
        assert!(plan.questions.iter().all(|q| q.mode == QuizMode::FindAny && q.max_fret == 5));
    }

    #[test]
    fn test_find_on_string_targets_playable_string() {
        let performances: Vec<NotePerformance> = PitchClass::ALL
            .iter()
            .map(|&note| perf(note, Some(0.9), 40, 0.1, false))
            .collect();
        let tuning = StringTuning::standard();
        let plan = build_quiz(&performances, &tuning, 40, &SequencerConfig::default(), &mut seeded());
        assert_eq!(plan.tier, SkillTier::Advanced);
        for q in plan.questions.iter().filter(|q| q.mode == QuizMode::FindOnString) {
            let string = q.target_string.unwrap();
            assert!(playable_strings(&tuning, q.note, q.max_fret).contains(&string));
            assert!(!q.targets(&tuning).is_empty());
        }
    }

    #[test]
    fn test_seeded_sequencer_is_reproducible() {
        let config = SequencerConfig {
            seed: Some(42),
            ..Default::default()
        };
        let tuning = StringTuning::standard();
        let a = QuizSequencer::new(config.clone()).generate(&[], &tuning, 15);
        let b = QuizSequencer::new(config).generate(&[], &tuning, 15);
        assert_eq!(a, b);
    }
}
