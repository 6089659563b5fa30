use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::{Ineligible, Question, QuestionError};
use crate::model::raw::RawQuestionRecord;

//
// ─── LOAD OUTCOME ──────────────────────────────────────────────────────────────
//

/// Why a single record was left out of a bank.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecordRejection {
    #[error("malformed source record: {0}")]
    Malformed(#[from] QuestionError),

    #[error("ineligible record: {0}")]
    Ineligible(#[from] Ineligible),
}

/// A record skipped during load, with its 0-based position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub position: usize,
    pub reason: RecordRejection,
}

impl RejectedRecord {
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self.reason, RecordRejection::Malformed(_))
    }
}

/// Result of loading a batch of raw records.
#[derive(Debug, Clone)]
pub struct BankLoad {
    pub bank: QuestionBank,
    pub rejected: Vec<RejectedRecord>,
}

impl BankLoad {
    #[must_use]
    pub fn malformed_count(&self) -> usize {
        self.rejected.iter().filter(|r| r.is_malformed()).count()
    }

    #[must_use]
    pub fn ineligible_count(&self) -> usize {
        self.rejected.len() - self.malformed_count()
    }
}

//
// ─── BANK ──────────────────────────────────────────────────────────────────────
//

/// Ordered, read-only collection of eligible questions.
///
/// Questions are reference counted so rosters built from the bank share them
/// instead of copying.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Arc<Question>>,
}

impl QuestionBank {
    /// Builds a bank from questions that were validated elsewhere.
    ///
    /// Ineligible questions are dropped.
    #[must_use]
    pub fn from_questions(questions: impl IntoIterator<Item = Question>) -> Self {
        Self {
            questions: questions
                .into_iter()
                .filter(Question::is_eligible)
                .map(Arc::new)
                .collect(),
        }
    }

    /// Loads typed raw records, skipping malformed and ineligible ones.
    #[must_use]
    pub fn load(records: impl IntoIterator<Item = RawQuestionRecord>) -> BankLoad {
        Self::ingest(records.into_iter().map(Ok))
    }

    /// Loads one JSON document per record.
    ///
    /// A document that does not decode as a record is rejected on its own
    /// without affecting the rest of the batch.
    #[must_use]
    pub fn load_json(documents: impl IntoIterator<Item = serde_json::Value>) -> BankLoad {
        Self::ingest(documents.into_iter().map(|doc| {
            serde_json::from_value::<RawQuestionRecord>(doc)
                .map_err(|e| QuestionError::Decode(e.to_string()))
        }))
    }

    fn ingest(
        records: impl Iterator<Item = Result<RawQuestionRecord, QuestionError>>,
    ) -> BankLoad {
        let mut questions = Vec::new();
        let mut rejected = Vec::new();
        let mut seen_ids = HashSet::new();

        for (position, record) in records.enumerate() {
            let outcome = record.map_err(RecordRejection::from).and_then(|raw| {
                let id = question_id_for(&raw, position, &seen_ids);
                Question::from_raw(id, &raw)?.map_err(RecordRejection::from)
            });

            match outcome {
                Ok(question) => {
                    seen_ids.insert(question.id().clone());
                    questions.push(Arc::new(question));
                }
                Err(reason) => rejected.push(RejectedRecord { position, reason }),
            }
        }

        BankLoad {
            bank: Self { questions },
            rejected,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<Question>> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn questions(&self) -> &[Arc<Question>] {
        &self.questions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Question>> {
        self.questions.iter()
    }
}

/// Source identifier when present, otherwise the 1-based record ordinal.
fn question_id_for(
    raw: &RawQuestionRecord,
    position: usize,
    seen: &HashSet<QuestionId>,
) -> QuestionId {
    let ordinal = position + 1;
    match raw.filename.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => {
            let id = QuestionId::new(name);
            if seen.contains(&id) {
                QuestionId::new(format!("{name}#{ordinal}"))
            } else {
                id
            }
        }
        _ => QuestionId::ordinal(ordinal),
    }
}

/// Returns true if the question may appear in a quiz.
#[must_use]
pub fn eligible(question: &Question) -> bool {
    question.is_eligible()
}
