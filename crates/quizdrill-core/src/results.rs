//! Result shaping: pure functions from a [`ScoredAttempt`] to display data.
//!
//! The pass threshold is a parameter everywhere. The platform historically
//! used a generic 70% bar in the summary header while the inline quiz view
//! used the quiz's own `passing_score_percent`; callers pick one instead of
//! this module hardcoding either.

use serde::Serialize;

use crate::model::ScoredAttempt;

/// The generic pass bar used when no quiz-specific threshold applies.
pub const DEFAULT_PASS_THRESHOLD: f64 = 70.0;

/// Aggregate summary for the results header.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptSummary {
    pub correct_answers: usize,
    pub total_questions: usize,
    pub percent: f64,
    pub passed: bool,
    /// Elapsed time formatted as `"{m}m {s}s"`.
    pub duration: String,
    pub timed_out: bool,
}

/// How one option of a choice question should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionTag {
    /// The correct answer, always highlighted.
    CorrectAnswer,
    /// The learner's pick when it was wrong, highlighted differently.
    WrongPick,
    /// Everything else.
    Plain,
}

/// One option with its display tag.
#[derive(Debug, Clone, Serialize)]
pub struct OptionDisplay {
    pub text: String,
    pub tag: OptionTag,
}

/// Per-question breakdown row.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionReview {
    pub question_id: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub correct: bool,
    pub points_earned: f64,
    pub max_points: f64,
    /// `100 * points_earned / max_points`, 0 when `max_points` is 0.
    pub percent: f64,
    pub options: Vec<OptionDisplay>,
    pub resources: Vec<String>,
}

/// Build the aggregate summary against the given pass threshold (0-100).
pub fn summarize(attempt: &ScoredAttempt, pass_threshold: f64) -> AttemptSummary {
    let correct_answers = attempt.answers.iter().filter(|a| a.correct).count();
    let percent = attempt.percent();
    AttemptSummary {
        correct_answers,
        total_questions: attempt.answers.len(),
        percent,
        passed: percent >= pass_threshold,
        duration: format_duration(attempt.duration_sec),
        timed_out: attempt.timed_out,
    }
}

/// Build the per-question breakdown, tagging each option of a choice
/// question as correct-answer, wrong-pick, or plain.
pub fn review(attempt: &ScoredAttempt) -> Vec<QuestionReview> {
    attempt
        .answers
        .iter()
        .map(|a| {
            let percent = if a.max_points > 0.0 {
                100.0 * a.points_earned / a.max_points
            } else {
                0.0
            };
            let options = a
                .options
                .iter()
                .map(|text| {
                    let tag = if *text == a.correct_answer {
                        OptionTag::CorrectAnswer
                    } else if *text == a.user_answer && !a.correct {
                        OptionTag::WrongPick
                    } else {
                        OptionTag::Plain
                    };
                    OptionDisplay {
                        text: text.clone(),
                        tag,
                    }
                })
                .collect();
            QuestionReview {
                question_id: a.question_id.clone(),
                user_answer: a.user_answer.clone(),
                correct_answer: a.correct_answer.clone(),
                correct: a.correct,
                points_earned: a.points_earned,
                max_points: a.max_points,
                percent,
                options,
                resources: a.resources.clone(),
            }
        })
        .collect()
}

/// Render a duration as `"{m}m {s}s"`, no zero-padding.
pub fn format_duration(secs: u64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}
