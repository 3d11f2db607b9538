//! Quiz progression as an explicit state machine.
//!
//! ```text
//! Idle --Start--> AwaitingAnswer --Answer(closed)--> ShowingFeedback
//!                   ^    |                                 |
//!                   |    +--Answer(open)--+                | FeedbackElapsed
//!                   |                     |                v
//!                   +---------------------+----- next question / Complete
//! ```
//!
//! Any state except `Complete` can be abandoned. Transitions are pure
//! ([`next_state`]); [`QuizSession`] applies them and keeps the results. How
//! long feedback stays visible is up to the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::answer::{ClickVerdict, FindAllMissPolicy, QuestionProgress};
use super::{QuizMode, QuizPlan, QuizQuestion};
use crate::error::{EngineError, EngineResult};
use crate::pitch::StringTuning;
use crate::sanitize::sanitize_duration;
use crate::types::{AttemptRecord, FretPosition, PitchClass};

const HISTORY_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizState {
    Idle,
    AwaitingAnswer,
    ShowingFeedback,
    Complete,
}

impl QuizState {
    pub const fn as_str(self) -> &'static str {
        match self {
            QuizState::Idle => "IDLE",
            QuizState::AwaitingAnswer => "AWAITING_ANSWER",
            QuizState::ShowingFeedback => "SHOWING_FEEDBACK",
            QuizState::Complete => "COMPLETE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    Start { has_questions: bool },
    Answer { question_complete: bool },
    FeedbackElapsed { has_next: bool },
    Abandon,
}

impl QuizEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            QuizEvent::Start { .. } => "start",
            QuizEvent::Answer { .. } => "answer",
            QuizEvent::FeedbackElapsed { .. } => "feedback-elapsed",
            QuizEvent::Abandon => "abandon",
        }
    }
}

pub fn next_state(state: QuizState, event: QuizEvent) -> EngineResult<QuizState> {
    use QuizState::*;

    match (state, event) {
        (Idle, QuizEvent::Start { has_questions: true }) => Ok(AwaitingAnswer),
        (Idle, QuizEvent::Start { has_questions: false }) => Ok(Complete),
        (AwaitingAnswer, QuizEvent::Answer { question_complete: true }) => Ok(ShowingFeedback),
        (AwaitingAnswer, QuizEvent::Answer { question_complete: false }) => Ok(AwaitingAnswer),
        (ShowingFeedback, QuizEvent::FeedbackElapsed { has_next: true }) => Ok(AwaitingAnswer),
        (ShowingFeedback, QuizEvent::FeedbackElapsed { has_next: false }) => Ok(Complete),
        (Idle | AwaitingAnswer | ShowingFeedback, QuizEvent::Abandon) => Ok(Complete),
        (from, event) => Err(EngineError::InvalidTransition {
            from,
            event: event.name().to_string(),
        }),
    }
}

#[derive(Debug, Clone)]
pub struct QuizTransition {
    pub from: QuizState,
    pub to: QuizState,
    pub event: &'static str,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub index: usize,
    pub note: PitchClass,
    pub mode: QuizMode,
    pub correct: bool,
    pub clicks: u32,
    pub misses: u32,
    /// From the question appearing to it closing
    pub elapsed_seconds: f64,
}

/// Result of one click, with the attempt the host should persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickOutcome {
    pub verdict: ClickVerdict,
    pub attempt: AttemptRecord,
    pub state: QuizState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub total_questions: usize,
    pub answered: usize,
    pub correct: usize,
    pub abandoned: bool,
}

impl QuizSummary {
    pub fn accuracy(&self) -> Option<f64> {
        crate::sanitize::safe_ratio(self.correct as f64, self.answered as f64)
    }
}

pub struct QuizSession {
    plan: QuizPlan,
    tuning: StringTuning,
    miss_policy: FindAllMissPolicy,
    state: QuizState,
    current: usize,
    progress: Option<QuestionProgress>,
    question_started_at: Option<DateTime<Utc>>,
    last_click_at: Option<DateTime<Utc>>,
    results: Vec<QuestionResult>,
    abandoned: bool,
    history: Vec<QuizTransition>,
}

impl QuizSession {
    pub fn new(plan: QuizPlan, tuning: StringTuning, miss_policy: FindAllMissPolicy) -> Self {
        Self {
            plan,
            tuning,
            miss_policy,
            state: QuizState::Idle,
            current: 0,
            progress: None,
            question_started_at: None,
            last_click_at: None,
            results: Vec::new(),
            abandoned: false,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn plan(&self) -> &QuizPlan {
        &self.plan
    }

    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    pub fn history(&self) -> &[QuizTransition] {
        &self.history
    }

    /// The question on screen, if any.
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        match self.state {
            QuizState::AwaitingAnswer | QuizState::ShowingFeedback => self.plan.questions.get(self.current),
            _ => None,
        }
    }

    pub fn current_progress(&self) -> Option<&QuestionProgress> {
        self.progress.as_ref()
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> EngineResult<QuizState> {
        let has_questions = !self.plan.is_empty();
        self.apply(QuizEvent::Start { has_questions }, now)?;
        if has_questions {
            self.open_question(0, now);
        }
        info!(
            questions = self.plan.len(),
            tier = self.plan.tier.as_str(),
            "quiz started"
        );
        Ok(self.state)
    }

    /// Evaluate a click on the fretboard.
    pub fn click(&mut self, position: FretPosition, now: DateTime<Utc>) -> EngineResult<ClickOutcome> {
        if self.state != QuizState::AwaitingAnswer {
            return Err(EngineError::InvalidTransition {
                from: self.state,
                event: QuizEvent::Answer { question_complete: false }.name().to_string(),
            });
        }
        let progress = self
            .progress
            .as_mut()
            .ok_or(EngineError::QuestionClosed(self.current))?;

        let verdict = progress.click(&self.tuning, position, self.miss_policy)?;

        let since = self.last_click_at.or(self.question_started_at).unwrap_or(now);
        let attempt = AttemptRecord {
            note: progress.question().note,
            correct: verdict.correct,
            response_time_seconds: seconds_between(since, now),
            timestamp: now,
        };
        self.last_click_at = Some(now);

        if verdict.question_complete {
            let question = progress.question();
            let correct = match question.mode {
                QuizMode::FindAll => true,
                _ => verdict.correct,
            };
            self.results.push(QuestionResult {
                index: question.index,
                note: question.note,
                mode: question.mode,
                correct,
                clicks: progress.clicks(),
                misses: progress.misses(),
                elapsed_seconds: self
                    .question_started_at
                    .map(|start| seconds_between(start, now))
                    .unwrap_or(0.0),
            });
        }

        self.apply(
            QuizEvent::Answer {
                question_complete: verdict.question_complete,
            },
            now,
        )?;

        debug!(
            note = %attempt.note,
            correct = verdict.correct,
            complete = verdict.question_complete,
            "quiz click"
        );

        Ok(ClickOutcome {
            verdict,
            attempt,
            state: self.state,
        })
    }

    /// Called by the host once feedback has been shown long enough.
    pub fn advance(&mut self, now: DateTime<Utc>) -> EngineResult<QuizState> {
        let has_next = self.current + 1 < self.plan.len();
        self.apply(QuizEvent::FeedbackElapsed { has_next }, now)?;
        if has_next {
            self.open_question(self.current + 1, now);
        } else {
            self.progress = None;
            info!(correct = self.summary().correct, "quiz complete");
        }
        Ok(self.state)
    }

    /// Stop early; results of closed questions are kept.
    pub fn abandon(&mut self, now: DateTime<Utc>) -> EngineResult<QuizState> {
        self.apply(QuizEvent::Abandon, now)?;
        self.abandoned = true;
        self.progress = None;
        info!(answered = self.results.len(), "quiz abandoned");
        Ok(self.state)
    }

    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            total_questions: self.plan.len(),
            answered: self.results.len(),
            correct: self.results.iter().filter(|r| r.correct).count(),
            abandoned: self.abandoned,
        }
    }

    fn open_question(&mut self, index: usize, now: DateTime<Utc>) {
        self.current = index;
        self.progress = self
            .plan
            .questions
            .get(index)
            .cloned()
            .map(|q| QuestionProgress::new(q, &self.tuning));
        self.question_started_at = Some(now);
        self.last_click_at = None;
    }

    fn apply(&mut self, event: QuizEvent, now: DateTime<Utc>) -> EngineResult<()> {
        let from = self.state;
        let to = next_state(from, event)?;

        self.state = to;
        self.history.push(QuizTransition {
            from,
            to,
            event: event.name(),
            at: now,
        });
        if self.history.len() > HISTORY_LIMIT {
            let extra = self.history.len() - HISTORY_LIMIT;
            self.history.drain(0..extra);
        }

        Ok(())
    }
}

fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    sanitize_duration((end - start).num_milliseconds() as f64 / 1000.0)
}
