//! Click evaluation for quiz questions.
//!
//! - find-any: any click closes the question; correct when the note matches
//! - find-on-string: any click closes the question; correct when note and string match
//! - find-all: stays open until every target position has been clicked;
//!   wrong clicks never close it

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{QuizMode, QuizQuestion};
use crate::error::{EngineError, EngineResult};
use crate::pitch::{note_at, StringTuning};
use crate::types::{FretPosition, PitchClass};

/// What a wrong click does to find-all progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindAllMissPolicy {
    /// Found positions stay found
    #[default]
    KeepProgress,
    /// A miss clears every found position
    ResetProgress,
}

impl FindAllMissPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "keep" | "keep-progress" => Some(Self::KeepProgress),
            "reset" | "reset-progress" => Some(Self::ResetProgress),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickVerdict {
    pub correct: bool,
    pub question_complete: bool,
    pub clicked_note: PitchClass,
    /// find-all only: this click uncovered a position not found before
    pub newly_found: bool,
    pub found: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone)]
pub struct QuestionProgress {
    question: QuizQuestion,
    targets: Vec<FretPosition>,
    found: BTreeSet<FretPosition>,
    misses: u32,
    clicks: u32,
    complete: bool,
}

impl QuestionProgress {
    pub fn new(question: QuizQuestion, tuning: &StringTuning) -> Self {
        let targets = question.targets(tuning);
        Self {
            question,
            targets,
            found: BTreeSet::new(),
            misses: 0,
            clicks: 0,
            complete: false,
        }
    }

    pub fn question(&self) -> &QuizQuestion {
        &self.question
    }

    pub fn targets(&self) -> &[FretPosition] {
        &self.targets
    }

    pub fn found(&self) -> &BTreeSet<FretPosition> {
        &self.found
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn click(
        &mut self,
        tuning: &StringTuning,
        position: FretPosition,
        miss_policy: FindAllMissPolicy,
    ) -> EngineResult<ClickVerdict> {
        if self.complete {
            return Err(EngineError::QuestionClosed(self.question.index));
        }
        if position.fret > self.question.max_fret {
            return Err(EngineError::FretOutOfRange {
                fret: position.fret as u32,
                max_fret: self.question.max_fret,
            });
        }

        let clicked_note = note_at(tuning, position.string_index, position.fret)?;
        let note_matches = clicked_note == self.question.note;
        self.clicks += 1;

        let mut newly_found = false;
        let correct = match self.question.mode {
            QuizMode::FindAny => {
                self.complete = true;
                note_matches
            }
            QuizMode::FindOnString => {
                self.complete = true;
                note_matches && self.question.target_string == Some(position.string_index)
            }
            QuizMode::FindAll => {
                if note_matches && self.targets.contains(&position) {
                    newly_found = self.found.insert(position);
                    self.complete = self.found.len() == self.targets.len();
                    true
                } else {
                    if miss_policy == FindAllMissPolicy::ResetProgress {
                        self.found.clear();
                    }
                    false
                }
            }
        };

        if !correct {
            self.misses += 1;
        }

        Ok(ClickVerdict {
            correct,
            question_complete: self.complete,
            clicked_note,
            newly_found,
            found: self.found.len(),
            remaining: self.targets.len() - self.found.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(note: PitchClass, mode: QuizMode, target_string: Option<usize>, max_fret: u8) -> QuizQuestion {
        QuizQuestion {
            index: 0,
            note,
            mode,
            target_string,
            max_fret,
        }
    }

    #[test]
    fn test_find_any_closes_on_wrong_click() {
        let tuning = StringTuning::standard();
        let mut progress = QuestionProgress::new(question(PitchClass::C, QuizMode::FindAny, None, 5), &tuning);
        let verdict = progress
            .click(&tuning, FretPosition::at(0, 0), FindAllMissPolicy::default())
            .unwrap();
        assert!(!verdict.correct);
        assert!(verdict.question_complete);
        assert_eq!(verdict.clicked_note, PitchClass::E);
        assert!(matches!(
            progress.click(&tuning, FretPosition::at(4, 3), FindAllMissPolicy::default()),
            Err(EngineError::QuestionClosed(0))
        ));
    }

    #[test]
    fn test_find_any_accepts_any_string() {
        let tuning = StringTuning::standard();
        let mut progress = QuestionProgress::new(question(PitchClass::C, QuizMode::FindAny, None, 5), &tuning);
        let verdict = progress
            .click(&tuning, FretPosition::at(1, 1), FindAllMissPolicy::default())
            .unwrap();
        assert!(verdict.correct);
    }

    #[test]
    fn test_find_on_string_requires_string_match() {
        let tuning = StringTuning::standard();
        let q = question(PitchClass::C, QuizMode::FindOnString, Some(4), 12);

        let mut wrong_string = QuestionProgress::new(q.clone(), &tuning);
        let verdict = wrong_string
            .click(&tuning, FretPosition::at(1, 1), FindAllMissPolicy::default())
            .unwrap();
        assert!(!verdict.correct);
        assert!(verdict.question_complete);

        let mut right = QuestionProgress::new(q, &tuning);
        let verdict = right
            .click(&tuning, FretPosition::at(4, 3), FindAllMissPolicy::default())
            .unwrap();
        assert!(verdict.correct);
    }

    #[test]
    fn test_find_all_stays_open_until_every_target() {
        let tuning = StringTuning::standard();
        let mut progress = QuestionProgress::new(question(PitchClass::C, QuizMode::FindAll, None, 5), &tuning);
        assert_eq!(progress.targets().len(), 3);

        let miss = progress
            .click(&tuning, FretPosition::at(0, 0), FindAllMissPolicy::KeepProgress)
            .unwrap();
        assert!(!miss.correct);
        assert!(!miss.question_complete);

        progress
            .click(&tuning, FretPosition::at(1, 1), FindAllMissPolicy::KeepProgress)
            .unwrap();
        let repeat = progress
            .click(&tuning, FretPosition::at(1, 1), FindAllMissPolicy::KeepProgress)
            .unwrap();
        assert!(repeat.correct);
        assert!(!repeat.newly_found);
        assert_eq!(repeat.remaining, 2);

        progress
            .click(&tuning, FretPosition::at(2, 5), FindAllMissPolicy::KeepProgress)
            .unwrap();
        let last = progress
            .click(&tuning, FretPosition::at(4, 3), FindAllMissPolicy::KeepProgress)
            .unwrap();
        assert!(last.question_complete);
        assert_eq!(last.remaining, 0);
        assert_eq!(progress.misses(), 1);
        assert_eq!(progress.clicks(), 5);
    }

    #[test]
    fn test_find_all_reset_policy_clears_progress() {
        let tuning = StringTuning::standard();
        let mut progress = QuestionProgress::new(question(PitchClass::C, QuizMode::FindAll, None, 5), &tuning);
        progress
            .click(&tuning, FretPosition::at(1, 1), FindAllMissPolicy::ResetProgress)
            .unwrap();
        let miss = progress
            .click(&tuning, FretPosition::at(0, 0), FindAllMissPolicy::ResetProgress)
            .unwrap();
        assert_eq!(miss.found, 0);
        assert_eq!(miss.remaining, 3);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_click_beyond_fret_range_is_rejected() {
        let tuning = StringTuning::standard();
        let mut progress = QuestionProgress::new(question(PitchClass::C, QuizMode::FindAny, None, 5), &tuning);
        assert_eq!(
            progress.click(&tuning, FretPosition::at(0, 8), FindAllMissPolicy::default()),
            Err(EngineError::FretOutOfRange { fret: 8, max_fret: 5 })
        );
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_miss_policy_parse() {
        assert_eq!(FindAllMissPolicy::parse("Reset"), Some(FindAllMissPolicy::ResetProgress));
        assert_eq!(FindAllMissPolicy::parse("keep-progress"), Some(FindAllMissPolicy::KeepProgress));
        assert_eq!(FindAllMissPolicy::parse("punish"), None);
    }
}
