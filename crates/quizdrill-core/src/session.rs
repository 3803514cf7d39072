//! The quiz session orchestrator.
//!
//! `QuizSession` ties one [`AttemptState`] to one countdown and one remote
//! [`QuizService`]. It is the only place that performs phase transitions,
//! which is what makes the submission guarantees hold:
//!
//! - at most one submission is ever in flight (`phase` guard under one lock),
//! - a timeout submit and a manual submit are mutually exclusive,
//! - a scoring response that arrives after the session was closed, or after
//!   its submission was superseded, is dropped (per-submission token).

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use anyhow::Result;

use crate::attempt::{AttemptState, Phase, SubmitReason, Tick};
use crate::error::ServiceError;
use crate::model::{Question, Quiz, ScoredAttempt};
use crate::timer::Countdown;
use crate::traits::{QuizService, Session};

/// Snapshot of the attempt for a renderer: current question, progress, and
/// the remaining-time display string.
#[derive(Debug, Clone)]
pub struct AttemptView {
    pub index: usize,
    pub total: usize,
    pub question: Question,
    pub answer: Option<String>,
    pub answered: usize,
    pub progress: f64,
    pub remaining: Option<String>,
    pub phase: Phase,
}

/// One learner's live pass through one quiz. Cheap to clone (shared
/// internals); a retry of the whole quiz is a brand-new session.
#[derive(Clone)]
pub struct QuizSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    service: Arc<dyn QuizService>,
    identity: Session,
    quiz_id: String,
    state: Mutex<AttemptState>,
    countdown: Mutex<Option<Countdown>>,
}

impl QuizSession {
    /// Fetch the quiz and start an attempt. The countdown starts immediately
    /// for a timed quiz.
    pub async fn start(
        service: Arc<dyn QuizService>,
        identity: Session,
        quiz_id: &str,
    ) -> Result<Self> {
        let quiz = service.fetch_quiz(quiz_id).await?;
        Self::from_quiz(service, identity, quiz)
    }

    /// Start an attempt over an already-fetched quiz.
    pub fn from_quiz(service: Arc<dyn QuizService>, identity: Session, quiz: Quiz) -> Result<Self> {
        let state = AttemptState::new(quiz)?;
        let timed = state.remaining_secs().is_some();
        let quiz_id = state.quiz().id.clone();

        let inner = Arc::new(SessionInner {
            service,
            identity,
            quiz_id,
            state: Mutex::new(state),
            countdown: Mutex::new(None),
        });

        if timed {
            let countdown = spawn_countdown(Arc::downgrade(&inner));
            *inner.countdown.lock().unwrap() = Some(countdown);
        }

        Ok(Self { inner })
    }

    /// Record the learner's answer for a question. Last write wins.
    pub fn record_answer(&self, index: usize, value: impl Into<String>) -> Result<()> {
        let mut state = self.inner.state.lock().unwrap();
        state.record_answer(index, value)?;
        Ok(())
    }

    /// Jump to a question; out-of-range indices are clamped.
    pub fn go_to(&self, index: usize) {
        self.inner.state.lock().unwrap().go_to(index);
    }

    /// Advance one question; no-op at the last question.
    pub fn next(&self) {
        self.inner.state.lock().unwrap().next();
    }

    /// Go back one question; no-op at question 0.
    pub fn previous(&self) {
        self.inner.state.lock().unwrap().previous();
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.lock().unwrap().phase()
    }

    pub fn quiz(&self) -> Quiz {
        self.inner.state.lock().unwrap().quiz().clone()
    }

    /// The scored result, once the attempt has completed.
    pub fn result(&self) -> Option<ScoredAttempt> {
        self.inner.state.lock().unwrap().scored().cloned()
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> AttemptView {
        let state = self.inner.state.lock().unwrap();
        AttemptView {
            index: state.current_index(),
            total: state.quiz().questions.len(),
            question: state.current_question().clone(),
            answer: state.answer(state.current_index()).map(str::to_string),
            answered: state.answered_count(),
            progress: state.progress(),
            remaining: state.remaining_display(),
            phase: state.phase(),
        }
    }

    /// Manually submit the attempt for scoring. Also the retry entry point
    /// after a failed submission; the accumulated answers are resent.
    pub async fn submit(&self) -> Result<ScoredAttempt> {
        self.inner.clone().submit(SubmitReason::Manual).await
    }

    /// Detach the session: stop the countdown and drop any pending
    /// submission so a late scoring response mutates nothing. Called when
    /// the learner leaves the attempt view.
    pub fn close(&self) {
        self.inner.stop_countdown();
        self.inner.state.lock().unwrap().invalidate_pending();
    }
}

impl SessionInner {
    async fn submit(self: Arc<Self>, reason: SubmitReason) -> Result<ScoredAttempt> {
        // Phase check and transition are one step under the lock, so a
        // manual submit and a timeout submit can never both pass the guard.
        let (submission, token) = {
            let mut state = self.state.lock().unwrap();
            state.begin_submit(reason, &self.identity.user_id)?
        };
        self.stop_countdown();

        tracing::debug!(
            quiz = %self.quiz_id,
            reason = ?reason,
            answered = submission.answers.iter().filter(|a| !a.is_empty()).count(),
            "submitting attempt"
        );

        match self.service.submit_attempt(&self.quiz_id, &submission).await {
            Ok(scored) => {
                let mut state = self.state.lock().unwrap();
                if state.complete(token, scored.clone()) {
                    Ok(scored)
                } else {
                    tracing::warn!(quiz = %self.quiz_id, "dropping stale scoring response");
                    anyhow::bail!("attempt was closed before the scoring response arrived");
                }
            }
            Err(e) => {
                let recoverable = e
                    .downcast_ref::<ServiceError>()
                    .map(ServiceError::is_recoverable)
                    .unwrap_or(false);
                let mut state = self.state.lock().unwrap();
                if recoverable {
                    state.reject(token);
                } else {
                    state.fail(token);
                }
                tracing::warn!(quiz = %self.quiz_id, error = %e, recoverable, "submit failed");
                Err(e)
            }
        }
    }

    fn stop_countdown(&self) {
        if let Some(countdown) = self.countdown.lock().unwrap().take() {
            countdown.cancel();
        }
    }
}

/// One tick per second against the shared state. The task holds only a weak
/// reference: dropping the session ends the loop on the next tick, and any
/// transition out of `InProgress` makes `tick()` report `Idle`, which also
/// ends it.
fn spawn_countdown(inner: Weak<SessionInner>) -> Countdown {
    Countdown::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first tick of a tokio interval completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(inner) = inner.upgrade() else { return };
            let tick = inner.state.lock().unwrap().tick();
            match tick {
                Tick::Running(_) => {}
                Tick::Idle => return,
                Tick::Expired => {
                    // Release our own handle without aborting ourselves
                    // before performing the one timeout submit.
                    if let Some(countdown) = inner.countdown.lock().unwrap().take() {
                        countdown.detach();
                    }
                    if let Err(e) = inner.submit(SubmitReason::Timeout).await {
                        tracing::warn!(error = %e, "timeout submit failed");
                    }
                    return;
                }
            }
        }
    })
}
