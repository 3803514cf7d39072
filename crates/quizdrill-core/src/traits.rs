//! The `QuizService` trait and the types that cross it.
//!
//! The engine never grades answers itself; it talks to the platform through
//! this trait. `quizdrill-client` provides the HTTP implementation and an
//! in-memory mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Quiz, ScoredAttempt};

/// The remote quiz platform: fetches quizzes and scores submissions.
#[async_trait]
pub trait QuizService: Send + Sync {
    /// Human-readable backend name (e.g. "http", "mock").
    fn name(&self) -> &str;

    /// Fetch a quiz by id. Fails with `ServiceError::NotFound` if the quiz
    /// does not exist.
    async fn fetch_quiz(&self, quiz_id: &str) -> anyhow::Result<Quiz>;

    /// Submit an attempt for scoring. Every call creates a new scoring
    /// record on the platform; callers must not retry a call that succeeded.
    async fn submit_attempt(
        &self,
        quiz_id: &str,
        submission: &AttemptSubmission,
    ) -> anyhow::Result<ScoredAttempt>;

    /// Fetch a previously scored attempt, e.g. when opening a shared results
    /// link. Independent of any in-memory attempt state.
    async fn fetch_attempt(&self, quiz_id: &str, attempt_id: &str)
        -> anyhow::Result<ScoredAttempt>;
}

/// The payload sent to the scorer. `answers[i]` corresponds positionally to
/// `Quiz.questions[i]`; a skipped question is an empty string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptSubmission {
    /// Who is submitting.
    pub user_id: String,
    /// One answer per question, in question order.
    pub answers: Vec<String>,
    /// Seconds the learner spent on the attempt.
    pub time_spent_sec: u64,
    /// True when the countdown, not the learner, triggered the submission.
    #[serde(default)]
    pub timed_out: bool,
}

/// Read-only identity capability injected into the engine at construction,
/// instead of a global session lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The authenticated learner's id.
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
