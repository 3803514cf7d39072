//! Scripted in-memory backend for tests and offline demos.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use quizdrill_core::error::ServiceError;
use quizdrill_core::model::{AnswerResult, Quiz, ScoredAttempt};
use quizdrill_core::traits::{AttemptSubmission, QuizService};

/// A mock quiz backend that grades locally against an answer key.
///
/// It stands in for the remote scorer: one point per question, exact match
/// after trimming. Tests can prime it to fail upcoming submissions and can
/// inspect how it was called.
pub struct MockQuizService {
    quiz: Quiz,
    answer_key: Vec<String>,
    /// Number of submit calls made.
    submit_count: AtomicU32,
    /// Last submission received.
    last_submission: Mutex<Option<AttemptSubmission>>,
    /// Errors to return from upcoming submit calls, in order.
    scripted_failures: Mutex<Vec<ServiceError>>,
    /// Scored attempts kept for `fetch_attempt`.
    stored: Mutex<Vec<ScoredAttempt>>,
}

impl MockQuizService {
    /// Create a mock for one quiz with its answer key. The key is positional:
    /// `answer_key[i]` grades `quiz.questions[i]`.
    pub fn new(quiz: Quiz, answer_key: Vec<String>) -> Self {
        Self {
            quiz,
            answer_key,
            submit_count: AtomicU32::new(0),
            last_submission: Mutex::new(None),
            scripted_failures: Mutex::new(Vec::new()),
            stored: Mutex::new(Vec::new()),
        }
    }

    /// Make the next submit call fail with the given error.
    pub fn fail_next_submit(&self, error: ServiceError) {
        self.scripted_failures.lock().unwrap().push(error);
    }

    /// Number of submit calls made so far.
    pub fn submit_count(&self) -> u32 {
        self.submit_count.load(Ordering::Relaxed)
    }

    /// The last submission received, if any.
    pub fn last_submission(&self) -> Option<AttemptSubmission> {
        self.last_submission.lock().unwrap().clone()
    }

    fn grade(&self, submission: &AttemptSubmission) -> ScoredAttempt {
        let answers: Vec<AnswerResult> = self
            .answer_key
            .iter()
            .enumerate()
            .map(|(i, correct_answer)| {
                let question = &self.quiz.questions[i];
                let user_answer = submission.answers.get(i).cloned().unwrap_or_default();
                let correct =
                    !user_answer.is_empty() && user_answer.trim() == correct_answer.trim();
                AnswerResult {
                    question_id: question.id.clone(),
                    user_answer,
                    correct_answer: correct_answer.clone(),
                    correct,
                    points_earned: if correct { 1.0 } else { 0.0 },
                    max_points: 1.0,
                    options: question.options().to_vec(),
                    resources: vec![],
                }
            })
            .collect();

        let total_score = answers.iter().map(|a| a.points_earned).sum();

        ScoredAttempt {
            id: Uuid::new_v4().to_string(),
            quiz_id: self.quiz.id.clone(),
            total_score,
            max_score: self.answer_key.len() as f64,
            duration_sec: submission.time_spent_sec,
            timed_out: submission.timed_out,
            answers,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl QuizService for MockQuizService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_quiz(&self, quiz_id: &str) -> anyhow::Result<Quiz> {
        if quiz_id != self.quiz.id {
            return Err(ServiceError::NotFound(quiz_id.to_string()).into());
        }
        Ok(self.quiz.clone())
    }

    async fn submit_attempt(
        &self,
        quiz_id: &str,
        submission: &AttemptSubmission,
    ) -> anyhow::Result<ScoredAttempt> {
        self.submit_count.fetch_add(1, Ordering::Relaxed);
        *self.last_submission.lock().unwrap() = Some(submission.clone());

        if quiz_id != self.quiz.id {
            return Err(ServiceError::NotFound(quiz_id.to_string()).into());
        }
        if submission.answers.len() != self.quiz.questions.len() {
            return Err(ServiceError::Validation(format!(
                "expected {} answers, got {}",
                self.quiz.questions.len(),
                submission.answers.len()
            ))
            .into());
        }
        {
            let mut failures = self.scripted_failures.lock().unwrap();
            if !failures.is_empty() {
                return Err(failures.remove(0).into());
            }
        }

        let scored = self.grade(submission);
        self.stored.lock().unwrap().push(scored.clone());
        Ok(scored)
    }

    async fn fetch_attempt(
        &self,
        quiz_id: &str,
        attempt_id: &str,
    ) -> anyhow::Result<ScoredAttempt> {
        if quiz_id != self.quiz.id {
            return Err(ServiceError::NotFound(quiz_id.to_string()).into());
        }
        self.stored
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == attempt_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(attempt_id.to_string()).into())
    }
}
