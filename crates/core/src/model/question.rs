use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::letter::{ChoiceLetter, LetterError, MAX_CHOICES};
use crate::model::raw::{RawQuestionRecord, RawVote};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a raw record cannot become a `Question`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("record could not be decoded: {0}")]
    Decode(String),

    #[error("too many choices: {count} (max {max})", max = MAX_CHOICES)]
    TooManyChoices { count: usize },

    #[error("vote {index} has an invalid letter list: {source}")]
    InvalidVoteLetters { index: usize, source: LetterError },

    #[error("vote {index} has a negative count: {count}")]
    NegativeVoteCount { index: usize, count: i64 },
}

/// Why a record is left out of a bank even though it decoded fine.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Ineligible {
    #[error("question text is missing or blank")]
    MissingPrompt,

    #[error("question has no choices")]
    NoChoices,
}

//
// ─── VOTES ─────────────────────────────────────────────────────────────────────
//

/// Validated vote tally entry: a set of letters and how many users picked it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord {
    letters: BTreeSet<ChoiceLetter>,
    count: u64,
}

impl VoteRecord {
    #[must_use]
    pub fn new(letters: impl IntoIterator<Item = ChoiceLetter>, count: u64) -> Self {
        Self {
            letters: letters.into_iter().collect(),
            count,
        }
    }

    /// Validates one raw vote entry.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for letters outside `A-Z` or negative counts.
    pub fn from_raw(index: usize, raw: &RawVote) -> Result<Self, QuestionError> {
        let letters = ChoiceLetter::parse_many(&raw.voted_answers)
            .map_err(|source| QuestionError::InvalidVoteLetters { index, source })?;
        let count = u64::try_from(raw.vote_count).map_err(|_| QuestionError::NegativeVoteCount {
            index,
            count: raw.vote_count,
        })?;
        Ok(Self::new(letters, count))
    }

    #[must_use]
    pub fn letters(&self) -> &BTreeSet<ChoiceLetter> {
        &self.letters
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single exam question, immutable once loaded into a bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    choices: Vec<String>,
    votes: Vec<VoteRecord>,
    site_answer: Option<String>,
}

impl Question {
    /// Builds a question from already-validated parts.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::TooManyChoices` past `Z`.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        choices: Vec<String>,
        votes: Vec<VoteRecord>,
    ) -> Result<Self, QuestionError> {
        if choices.len() > MAX_CHOICES {
            return Err(QuestionError::TooManyChoices {
                count: choices.len(),
            });
        }
        Ok(Self {
            id,
            prompt: prompt.into(),
            choices,
            votes,
            site_answer: None,
        })
    }

    /// Validates a raw record.
    ///
    /// The outer `Result` carries malformed-source failures; the inner one
    /// carries eligibility, so callers can tell the two apart.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the record is structurally invalid.
    pub fn from_raw(
        id: QuestionId,
        raw: &RawQuestionRecord,
    ) -> Result<Result<Self, Ineligible>, QuestionError> {
        let votes = raw
            .votes()
            .iter()
            .enumerate()
            .map(|(index, vote)| VoteRecord::from_raw(index, vote))
            .collect::<Result<Vec<_>, _>>()?;

        let prompt = match raw.question.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => return Ok(Err(Ineligible::MissingPrompt)),
        };
        if raw.choices.is_empty() {
            return Ok(Err(Ineligible::NoChoices));
        }

        let mut question = Self::new(id, prompt, raw.choices.clone(), votes)?;
        question.site_answer = raw
            .correct_answer
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_owned);
        Ok(Ok(question))
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Choice texts paired with their position-derived letters.
    pub fn lettered_choices(&self) -> impl Iterator<Item = (ChoiceLetter, &str)> {
        self.choices
            .iter()
            .enumerate()
            .filter_map(|(pos, text)| {
                ChoiceLetter::from_position(pos)
                    .ok()
                    .map(|letter| (letter, text.as_str()))
            })
    }

    /// Returns true if `letter` addresses one of this question's choices.
    #[must_use]
    pub fn has_choice(&self, letter: ChoiceLetter) -> bool {
        letter.position() < self.choices.len()
    }

    #[must_use]
    pub fn votes(&self) -> &[VoteRecord] {
        &self.votes
    }

    /// Answer printed by the source page, kept for audit only.
    #[must_use]
    pub fn site_answer(&self) -> Option<&str> {
        self.site_answer.as_deref()
    }

    /// A question is eligible when it has a non-blank prompt and at least one choice.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        !self.prompt.trim().is_empty() && !self.choices.is_empty()
    }
}
