use chrono::{DateTime, Utc};

use quiz_core::model::QuestionId;
use quiz_core::{AnswerKey, SelectionSet};

use super::session::Lifecycle;

/// Judgement of one submit action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Returned by `QuizSession::submit`; carries the key so the UI can show it on a miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub index: usize,
    pub outcome: Outcome,
    pub answer_key: AnswerKey,
    pub selection: SelectionSet,
}

/// Correct answers out of roster size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    pub lifecycle: Lifecycle,
    pub position: usize,
    pub total: usize,
    pub visited: usize,
    pub submitted: usize,
    pub correct: usize,
    pub attempts: u32,
}

/// Per-question line of the end-of-quiz review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub index: usize,
    pub question_id: QuestionId,
    pub selection: SelectionSet,
    pub answer_key: AnswerKey,
    /// Latest submit judgement, `None` if never submitted.
    pub outcome: Option<Outcome>,
}

/// Final figures of a completed quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSummary {
    pub score: Score,
    pub attempts: u32,
    pub accuracy: Option<f64>,
    pub ended_early: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
