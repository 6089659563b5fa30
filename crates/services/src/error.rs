//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{ChoiceLetter, SessionId};
use storage::repository::StorageError;

use crate::quiz::{Lifecycle, Operation};

/// Errors emitted by `QuizSession` and `SessionRegistry`.
///
/// A failed operation never leaves the session partially mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("cannot start a quiz with an empty roster")]
    EmptyRoster,

    #[error("cannot {operation} while the quiz is {state}")]
    InvalidTransition { operation: Operation, state: Lifecycle },

    #[error("question index {index} is out of range (roster has {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("choice {letter} is out of range (question has {choices} choices)")]
    ChoiceOutOfRange { letter: ChoiceLetter, choices: usize },

    #[error("question {index} has not been visited yet")]
    NotVisited { index: usize },

    #[error("unknown session {0}")]
    UnknownSession(SessionId),
}

/// Errors emitted by `BankService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while extracting records from source pages.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    #[error("{filename}: vote tally is not a list of votes: {source}")]
    VoteTally {
        filename: String,
        source: serde_json::Error,
    },
}

/// Errors emitted by `QuizLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizLoopError {
    #[error(transparent)]
    Bank(#[from] BankServiceError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
}
