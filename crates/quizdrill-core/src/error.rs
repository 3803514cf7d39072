//! Engine and service error types.
//!
//! `ServiceError` is defined here rather than in `quizdrill-client` so the
//! session can downcast and classify remote failures for phase transitions
//! without string matching.

use thiserror::Error;

use crate::attempt::Phase;

/// Errors raised by the attempt state machine itself.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The quiz has no questions, so an attempt cannot start.
    #[error("quiz '{0}' has no questions")]
    EmptyQuiz(String),

    /// An operation that requires an in-progress attempt was called in
    /// another phase.
    #[error("attempt is not in progress (phase: {0})")]
    NotInProgress(Phase),

    /// A submission is already in flight; a second one is never queued.
    #[error("a submission is already in flight")]
    SubmitInFlight,

    /// An answer was recorded against a question index the quiz does not have.
    #[error("question index {index} out of range (quiz has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors that can occur when talking to the remote quiz platform.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested quiz or attempt does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server rejected the submission payload.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Authentication failed (missing or invalid token).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),
}

impl ServiceError {
    /// Returns `true` if a failed submission should return the attempt to
    /// `InProgress` (the learner can fix and resubmit immediately) rather
    /// than parking it in `Failed`.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }
}
