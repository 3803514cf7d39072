//! The attempt state machine.
//!
//! `AttemptState` is a pure, synchronous machine: it owns the learner's
//! answers, the current position, and the remaining time, and it enforces
//! the phase transitions. All clocking and networking live in
//! [`crate::session`] and [`crate::timer`]; this module never blocks.

use std::collections::HashMap;
use std::fmt;

use tokio::time::Instant;
use uuid::Uuid;

use crate::error::AttemptError;
use crate::model::{Question, Quiz, ScoredAttempt};
use crate::timer::format_clock;
use crate::traits::AttemptSubmission;

/// Where the attempt currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The learner is answering questions.
    InProgress,
    /// A submission has been sent to the scorer and has not resolved yet.
    Submitting,
    /// The scorer accepted the submission; the result is attached. Terminal.
    Completed,
    /// The submission failed; answers are kept and a manual retry is allowed.
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::InProgress => write!(f, "in-progress"),
            Phase::Submitting => write!(f, "submitting"),
            Phase::Completed => write!(f, "completed"),
            Phase::Failed => write!(f, "failed"),
        }
    }
}

/// What triggered a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReason {
    /// The learner pressed submit.
    Manual,
    /// The countdown reached zero.
    Timeout,
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Time was decremented; this many seconds remain.
    Running(u64),
    /// The budget just ran out; the caller must trigger a timeout submit.
    Expired,
    /// Nothing to tick: untimed quiz, already expired, or not in progress.
    Idle,
}

/// Identifies one specific submission so a late or stale response can be
/// recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionToken(Uuid);

/// One learner's pass through a quiz. Created per attempt, never reused: a
/// retry of the whole quiz is a brand-new `AttemptState`.
#[derive(Debug)]
pub struct AttemptState {
    quiz: Quiz,
    current_index: usize,
    answers: HashMap<usize, String>,
    remaining_secs: Option<u64>,
    phase: Phase,
    started_at: Instant,
    pending: Option<SubmissionToken>,
    scored: Option<ScoredAttempt>,
}

impl AttemptState {
    /// Start a fresh attempt: question 0, no answers, full time budget.
    pub fn new(quiz: Quiz) -> Result<Self, AttemptError> {
        if quiz.questions.is_empty() {
            return Err(AttemptError::EmptyQuiz(quiz.id));
        }
        let remaining_secs = quiz.time_limit_secs();
        Ok(Self {
            quiz,
            current_index: 0,
            answers: HashMap::new(),
            remaining_secs,
            phase: Phase::InProgress,
            started_at: Instant::now(),
            pending: None,
            scored: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.quiz.questions[self.current_index]
    }

    /// The recorded answer for a question, if any.
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    /// How many questions have a non-empty answer.
    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|a| !a.is_empty()).count()
    }

    /// Fraction of questions answered, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.answered_count() as f64 / self.quiz.questions.len() as f64
    }

    pub fn remaining_secs(&self) -> Option<u64> {
        self.remaining_secs
    }

    /// Remaining time as `m:ss`, if the quiz is timed.
    pub fn remaining_display(&self) -> Option<String> {
        self.remaining_secs.map(format_clock)
    }

    /// The scored result, once the attempt has completed.
    pub fn scored(&self) -> Option<&ScoredAttempt> {
        self.scored.as_ref()
    }

    /// Record the learner's answer for a question. Last write wins; the
    /// value is not checked against the options (the server validates).
    pub fn record_answer(
        &mut self,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), AttemptError> {
        if self.phase != Phase::InProgress {
            return Err(AttemptError::NotInProgress(self.phase));
        }
        let len = self.quiz.questions.len();
        if index >= len {
            return Err(AttemptError::IndexOutOfRange { index, len });
        }
        self.answers.insert(index, value.into());
        Ok(())
    }

    /// Jump to a question, clamping an out-of-range index. Navigation is
    /// always permitted; unanswered questions may be skipped.
    pub fn go_to(&mut self, index: usize) {
        self.current_index = index.min(self.quiz.questions.len() - 1);
    }

    /// Advance one question; no-op at the last question.
    pub fn next(&mut self) {
        if self.current_index + 1 < self.quiz.questions.len() {
            self.current_index += 1;
        }
    }

    /// Go back one question; no-op at question 0.
    pub fn previous(&mut self) {
        self.current_index = self.current_index.saturating_sub(1);
    }

    /// Advance the countdown by one second. Only a timed, in-progress
    /// attempt ticks; the remaining time never goes below zero.
    pub fn tick(&mut self) -> Tick {
        if self.phase != Phase::InProgress {
            return Tick::Idle;
        }
        match self.remaining_secs {
            Some(remaining) if remaining > 0 => {
                let remaining = remaining - 1;
                self.remaining_secs = Some(remaining);
                if remaining == 0 {
                    Tick::Expired
                } else {
                    Tick::Running(remaining)
                }
            }
            _ => Tick::Idle,
        }
    }

    /// Transition into `Submitting` and build the positional payload.
    ///
    /// A manual submit is allowed from `InProgress` and (as a retry, with
    /// the accumulated answers) from `Failed`; a timeout submit only from
    /// `InProgress`. While a submission is in flight every further call
    /// fails with `SubmitInFlight` — never queued, never duplicated.
    pub fn begin_submit(
        &mut self,
        reason: SubmitReason,
        user_id: &str,
    ) -> Result<(AttemptSubmission, SubmissionToken), AttemptError> {
        match (self.phase, reason) {
            (Phase::Submitting, _) => return Err(AttemptError::SubmitInFlight),
            (Phase::InProgress, _) => {}
            (Phase::Failed, SubmitReason::Manual) => {}
            (phase, _) => return Err(AttemptError::NotInProgress(phase)),
        }

        let answers = (0..self.quiz.questions.len())
            .map(|i| self.answers.get(&i).cloned().unwrap_or_default())
            .collect();

        let time_spent_sec = match (self.quiz.time_limit_secs(), self.remaining_secs) {
            (Some(limit), Some(remaining)) => limit - remaining,
            _ => self.started_at.elapsed().as_secs(),
        };

        let token = SubmissionToken(Uuid::new_v4());
        self.pending = Some(token);
        self.phase = Phase::Submitting;

        Ok((
            AttemptSubmission {
                user_id: user_id.to_string(),
                answers,
                time_spent_sec,
                timed_out: reason == SubmitReason::Timeout,
            },
            token,
        ))
    }

    /// The scorer accepted the submission. Returns `false` (and changes
    /// nothing) when the token does not match the pending submission.
    pub fn complete(&mut self, token: SubmissionToken, scored: ScoredAttempt) -> bool {
        if !self.take_pending(token) {
            return false;
        }
        self.phase = Phase::Completed;
        self.scored = Some(scored);
        true
    }

    /// The submission failed; answers are kept for a manual retry.
    pub fn fail(&mut self, token: SubmissionToken) -> bool {
        if !self.take_pending(token) {
            return false;
        }
        self.phase = Phase::Failed;
        true
    }

    /// The server rejected the payload; the learner may fix and resubmit,
    /// so the attempt returns to `InProgress`.
    pub fn reject(&mut self, token: SubmissionToken) -> bool {
        if !self.take_pending(token) {
            return false;
        }
        self.phase = Phase::InProgress;
        true
    }

    /// Drop any pending submission without a transition, so a response that
    /// arrives after the attempt view was discarded resolves against
    /// nothing.
    pub fn invalidate_pending(&mut self) {
        self.pending = None;
    }

    fn take_pending(&mut self, token: SubmissionToken) -> bool {
        match self.pending {
            Some(pending) if pending == token => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionKind;
    use chrono::Utc;

    fn question(id: &str, options: &[&str]) -> Question {
        Question {
            id: id.into(),
            text: format!("prompt {id}"),
            kind: if options.is_empty() {
                QuestionKind::ShortAnswer
            } else {
                QuestionKind::MultipleChoice {
                    options: options.iter().map(|o| o.to_string()).collect(),
                }
            },
        }
    }

    fn quiz(n: usize, time_limit_minutes: Option<u32>) -> Quiz {
        Quiz {
            id: "quiz-1".into(),
            title: "Dental Anatomy".into(),
            questions: (0..n)
                .map(|i| question(&format!("q{i}"), &["a", "b", "c"]))
                .collect(),
            time_limit_minutes,
            passing_score_percent: 70.0,
        }
    }

    fn scored(quiz_id: &str) -> ScoredAttempt {
        ScoredAttempt {
            id: "attempt-1".into(),
            quiz_id: quiz_id.into(),
            total_score: 1.0,
            max_score: 3.0,
            duration_sec: 10,
            timed_out: false,
            answers: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn initialize_starts_at_question_zero() {
        let state = AttemptState::new(quiz(5, None)).unwrap();
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.answered_count(), 0);
        assert_eq!(state.phase(), Phase::InProgress);
        assert_eq!(state.remaining_secs(), None);
    }

    #[test]
    fn initialize_sets_time_budget() {
        let state = AttemptState::new(quiz(3, Some(2))).unwrap();
        assert_eq!(state.remaining_secs(), Some(120));
        assert_eq!(state.remaining_display().unwrap(), "2:00");
    }

    #[test]
    fn empty_quiz_is_rejected() {
        let err = AttemptState::new(quiz(0, None)).unwrap_err();
        assert!(matches!(err, AttemptError::EmptyQuiz(id) if id == "quiz-1"));
    }

    #[test]
    fn record_answer_last_write_wins() {
        let mut state = AttemptState::new(quiz(3, None)).unwrap();
        state.record_answer(1, "a").unwrap();
        state.record_answer(1, "a").unwrap();
        state.record_answer(1, "c").unwrap();
        assert_eq!(state.answer(1), Some("c"));
        assert_eq!(state.answered_count(), 1);
    }

    #[test]
    fn record_answer_out_of_range() {
        let mut state = AttemptState::new(quiz(3, None)).unwrap();
        let err = state.record_answer(3, "a").unwrap_err();
        assert!(matches!(
            err,
            AttemptError::IndexOutOfRange { index: 3, len: 3 }
        ));
    }

    #[test]
    fn navigation_clamps_and_noops_at_edges() {
        let mut state = AttemptState::new(quiz(3, None)).unwrap();
        state.previous();
        assert_eq!(state.current_index(), 0);
        state.go_to(99);
        assert_eq!(state.current_index(), 2);
        state.next();
        assert_eq!(state.current_index(), 2);
        state.go_to(1);
        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn navigation_allowed_without_answering() {
        let mut state = AttemptState::new(quiz(3, None)).unwrap();
        state.next();
        state.next();
        assert_eq!(state.current_index(), 2);
        assert_eq!(state.answered_count(), 0);
    }

    #[test]
    fn timer_expires_after_exactly_limit_ticks() {
        let mut state = AttemptState::new(quiz(1, Some(1))).unwrap();
        for i in 1..60 {
            assert_eq!(state.tick(), Tick::Running(60 - i));
        }
        assert_eq!(state.tick(), Tick::Expired);
        assert_eq!(state.remaining_secs(), Some(0));
        // Never negative, never a second expiry.
        assert_eq!(state.tick(), Tick::Idle);
        assert_eq!(state.remaining_secs(), Some(0));
    }

    #[test]
    fn untimed_attempt_never_ticks() {
        let mut state = AttemptState::new(quiz(2, None)).unwrap();
        assert_eq!(state.tick(), Tick::Idle);
    }

    #[test]
    fn submit_payload_is_positional() {
        let mut state = AttemptState::new(quiz(3, Some(1))).unwrap();
        state.record_answer(0, "a").unwrap();
        state.record_answer(2, "b").unwrap();
        for _ in 0..15 {
            state.tick();
        }

        let (submission, _) = state
            .begin_submit(SubmitReason::Manual, "student-7")
            .unwrap();
        assert_eq!(submission.answers, vec!["a", "", "b"]);
        assert_eq!(submission.time_spent_sec, 15);
        assert!(!submission.timed_out);
        assert_eq!(submission.user_id, "student-7");
        assert_eq!(state.phase(), Phase::Submitting);
    }

    #[test]
    fn timeout_submit_flags_timed_out() {
        let mut state = AttemptState::new(quiz(1, Some(1))).unwrap();
        while state.tick() != Tick::Expired {}
        let (submission, _) = state
            .begin_submit(SubmitReason::Timeout, "student-7")
            .unwrap();
        assert!(submission.timed_out);
        assert_eq!(submission.time_spent_sec, 60);
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let mut state = AttemptState::new(quiz(1, Some(1))).unwrap();
        state.begin_submit(SubmitReason::Manual, "u").unwrap();
        let err = state.begin_submit(SubmitReason::Timeout, "u").unwrap_err();
        assert!(matches!(err, AttemptError::SubmitInFlight));
    }

    #[test]
    fn timeout_cannot_fire_after_completion() {
        let mut state = AttemptState::new(quiz(1, Some(1))).unwrap();
        let (_, token) = state.begin_submit(SubmitReason::Manual, "u").unwrap();
        assert!(state.complete(token, scored("quiz-1")));
        let err = state.begin_submit(SubmitReason::Timeout, "u").unwrap_err();
        assert!(matches!(err, AttemptError::NotInProgress(Phase::Completed)));
        // The attempt is no longer in progress, so the countdown is idle too.
        assert_eq!(state.tick(), Tick::Idle);
    }

    #[test]
    fn failed_submit_keeps_answers_and_allows_manual_retry() {
        let mut state = AttemptState::new(quiz(2, None)).unwrap();
        state.record_answer(0, "a").unwrap();
        let (_, token) = state.begin_submit(SubmitReason::Manual, "u").unwrap();
        assert!(state.fail(token));
        assert_eq!(state.phase(), Phase::Failed);
        assert_eq!(state.answer(0), Some("a"));

        // Timeout retry from Failed is not a thing.
        assert!(state.begin_submit(SubmitReason::Timeout, "u").is_err());

        let (submission, _) = state.begin_submit(SubmitReason::Manual, "u").unwrap();
        assert_eq!(submission.answers, vec!["a", ""]);
    }

    #[test]
    fn rejected_submit_returns_to_in_progress() {
        let mut state = AttemptState::new(quiz(2, None)).unwrap();
        let (_, token) = state.begin_submit(SubmitReason::Manual, "u").unwrap();
        assert!(state.reject(token));
        assert_eq!(state.phase(), Phase::InProgress);
    }

    #[test]
    fn stale_token_is_ignored() {
        let mut state = AttemptState::new(quiz(1, None)).unwrap();
        let (_, token) = state.begin_submit(SubmitReason::Manual, "u").unwrap();
        assert!(state.reject(token));

        // The old token no longer resolves anything.
        assert!(!state.complete(token, scored("quiz-1")));
        assert!(!state.fail(token));
        assert_eq!(state.phase(), Phase::InProgress);
        assert!(state.scored().is_none());
    }

    #[test]
    fn invalidated_pending_drops_late_response() {
        let mut state = AttemptState::new(quiz(1, None)).unwrap();
        let (_, token) = state.begin_submit(SubmitReason::Manual, "u").unwrap();
        state.invalidate_pending();
        assert!(!state.complete(token, scored("quiz-1")));
        assert!(state.scored().is_none());
    }
}
