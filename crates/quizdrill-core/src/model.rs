//! Core data model types for quizdrill.
//!
//! These are the fundamental types the engine works with: the immutable
//! `Quiz` fetched once per attempt, and the `ScoredAttempt` the remote
//! scorer returns after submission.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quiz as fetched from the platform. Immutable for the attempt's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Unique identifier for this quiz.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Ordered questions. An attempt requires at least one.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Time budget in minutes. Absent means untimed.
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    /// Pass threshold (0-100) used for pass/fail labeling of this quiz.
    #[serde(default = "default_passing_score")]
    pub passing_score_percent: f64,
}

fn default_passing_score() -> f64 {
    70.0
}

impl Quiz {
    /// The time budget in seconds, if this quiz is timed.
    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_minutes.map(|m| u64::from(m) * 60)
    }
}

/// A single question within a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier for this question.
    pub id: String,
    /// The prompt shown to the learner.
    pub text: String,
    /// Question shape: choice-based or free text.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// The shape of a question. Correctness is resolved server-side only; the
/// client never sees which option is correct before submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Choice-based question with a fixed set of options.
    MultipleChoice {
        /// Ordered option texts. Non-empty for a well-formed question.
        options: Vec<String>,
    },
    /// Free-text question; the learner types the answer.
    ShortAnswer,
}

impl Question {
    /// The options for a choice-based question, empty for free text.
    pub fn options(&self) -> &[String] {
        match &self.kind {
            QuestionKind::MultipleChoice { options } => options,
            QuestionKind::ShortAnswer => &[],
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice { .. } => write!(f, "multiple-choice"),
            QuestionKind::ShortAnswer => write!(f, "short-answer"),
        }
    }
}

/// A scored attempt as returned by the remote scorer. Immutable once created;
/// never merged with a later attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredAttempt {
    /// Identifier assigned by the platform to this attempt.
    pub id: String,
    /// The quiz this attempt belongs to.
    pub quiz_id: String,
    /// Points earned across all questions.
    pub total_score: f64,
    /// Maximum points available.
    pub max_score: f64,
    /// Elapsed wall-clock time of the attempt in seconds.
    pub duration_sec: u64,
    /// True when the submission was triggered by the countdown reaching zero.
    #[serde(default)]
    pub timed_out: bool,
    /// Per-question results, ordered 1:1 with the quiz's questions.
    #[serde(default)]
    pub answers: Vec<AnswerResult>,
    /// When the platform recorded the attempt.
    pub created_at: DateTime<Utc>,
}

/// The scored outcome for a single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// The question this result belongs to.
    pub question_id: String,
    /// What the learner answered; empty string for a skipped question.
    #[serde(default)]
    pub user_answer: String,
    /// The correct answer, revealed after scoring.
    pub correct_answer: String,
    /// Whether the learner's answer was correct.
    pub correct: bool,
    /// Points awarded for this question.
    pub points_earned: f64,
    /// Maximum points for this question.
    pub max_points: f64,
    /// Option texts for choice-based questions, for display.
    #[serde(default)]
    pub options: Vec<String>,
    /// Revision resources attached by content authors, for display.
    #[serde(default)]
    pub resources: Vec<String>,
}

impl ScoredAttempt {
    /// Overall percentage, `100 * total_score / max_score`, clamped to
    /// `[0, 100]`; `0.0` when `max_score` is zero.
    pub fn percent(&self) -> f64 {
        if self.max_score <= 0.0 {
            return 0.0;
        }
        (100.0 * self.total_score / self.max_score).clamp(0.0, 100.0)
    }

    /// Save the attempt as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize attempt")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write attempt to {}", path.display()))?;
        Ok(())
    }

    /// Load an attempt from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read attempt from {}", path.display()))?;
        let attempt: ScoredAttempt =
            serde_json::from_str(&content).context("failed to parse attempt JSON")?;
        Ok(attempt)
    }
}
