//! Read-only statistics over the source documents of one question bank.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use quiz_core::answer_key::resolve_votes;
use quiz_core::model::{MAX_CHOICES, QuestionError, RawQuestionRecord, VoteRecord};

static QUESTION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)question\s+(\d+)").expect("question number pattern"));

const AUDITED_FIELDS: [&str; 4] = ["filename", "question", "correct_answer", "user_data"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceStats {
    pub min: usize,
    pub max: usize,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionVotes {
    pub question_id: String,
    pub votes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VotingStats {
    pub total_votes: u64,
    pub questions_with_votes: usize,
    pub highest_voted_question: Option<String>,
    pub highest_vote_count: u64,
    pub per_question: Vec<QuestionVotes>,
}

/// Aggregate audit of a bank, serialized as the report document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    /// Every source document, decodable or not.
    pub total_questions: usize,
    /// Documents the bank loader rejects as malformed.
    pub malformed_records: usize,
    pub question_numbers: Vec<u32>,
    pub null_counts: BTreeMap<String, usize>,
    pub choice_stats: ChoiceStats,
    pub voting_stats: VotingStats,
    /// Letter → number of questions whose accepted answer contains it.
    pub accepted_answer_histogram: BTreeMap<String, usize>,
    /// Answer printed by the source page → number of questions.
    pub site_answer_distribution: BTreeMap<String, usize>,
}

/// Same structural checks the bank loader applies before building a question.
fn validated_votes(record: &RawQuestionRecord) -> Result<Vec<VoteRecord>, QuestionError> {
    if record.choices.len() > MAX_CHOICES {
        return Err(QuestionError::TooManyChoices {
            count: record.choices.len(),
        });
    }
    record
        .votes()
        .iter()
        .enumerate()
        .map(|(index, vote)| VoteRecord::from_raw(index, vote))
        .collect()
}

/// Reduce source documents into an `AuditReport`.
///
/// Filename numbers and null counts come from every document. Choice and
/// vote statistics need a decoded record, so documents that do not decode
/// only count toward `total_questions` and `malformed_records`. A record
/// with any invalid vote entry keeps its vote totals but stays out of the
/// accepted-answer histogram, matching what the loader does with it.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn audit(documents: &[Value], generated_at: DateTime<Utc>) -> AuditReport {
    let mut question_numbers = Vec::new();
    let mut null_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut accepted_answer_histogram: BTreeMap<String, usize> = BTreeMap::new();
    let mut site_answer_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut malformed_records = 0;
    let mut voting = VotingStats {
        total_votes: 0,
        questions_with_votes: 0,
        highest_voted_question: None,
        highest_vote_count: 0,
        per_question: Vec::new(),
    };
    let mut decoded = 0;
    let mut min_choices = usize::MAX;
    let mut max_choices = 0;
    let mut sum_choices = 0;

    for (position, document) in documents.iter().enumerate() {
        let filename = document.get("filename").and_then(Value::as_str);

        if let Some(number) = filename
            .and_then(|name| QUESTION_NUMBER.captures(name))
            .and_then(|caps| caps[1].parse::<u32>().ok())
        {
            question_numbers.push(number);
        }

        for field in AUDITED_FIELDS {
            if document.get(field).is_none_or(Value::is_null) {
                *null_counts.entry(field.to_owned()).or_default() += 1;
            }
        }

        let Ok(record) = serde_json::from_value::<RawQuestionRecord>(document.clone()) else {
            malformed_records += 1;
            continue;
        };
        decoded += 1;

        let choices = record.choices.len();
        min_choices = min_choices.min(choices);
        max_choices = max_choices.max(choices);
        sum_choices += choices;

        let question_id = filename.map_or_else(|| (position + 1).to_string(), str::to_owned);
        let votes = record.total_votes();
        voting.total_votes += votes;
        if votes > 0 {
            voting.questions_with_votes += 1;
        }
        if votes > voting.highest_vote_count {
            voting.highest_vote_count = votes;
            voting.highest_voted_question = Some(question_id.clone());
        }
        voting.per_question.push(QuestionVotes { question_id, votes });

        match validated_votes(&record) {
            Ok(valid) => {
                for letter in resolve_votes(&valid).letters() {
                    *accepted_answer_histogram.entry(letter.to_string()).or_default() += 1;
                }
            }
            Err(_) => malformed_records += 1,
        }

        if let Some(answer) = record
            .correct_answer
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
        {
            *site_answer_distribution.entry(answer.to_owned()).or_default() += 1;
        }
    }

    question_numbers.sort_unstable();

    let choice_stats = if decoded == 0 {
        ChoiceStats {
            min: 0,
            max: 0,
            avg: 0.0,
        }
    } else {
        ChoiceStats {
            min: min_choices,
            max: max_choices,
            avg: sum_choices as f64 / decoded as f64,
        }
    };

    AuditReport {
        generated_at,
        total_questions: documents.len(),
        malformed_records,
        question_numbers,
        null_counts,
        choice_stats,
        voting_stats: voting,
        accepted_answer_histogram,
        site_answer_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionBank;
    use quiz_core::time::fixed_now;
    use serde_json::json;

    fn documents() -> Vec<Value> {
        vec![
            json!({
                "filename": "result_AWS question 12 discussion.html",
                "question": "Q12",
                "choices": ["a", "b", "c", "d"],
                "correct_answer": "B",
                "user_data": [
                    {"voted_answers": "B", "vote_count": 10},
                    {"voted_answers": "AB", "vote_count": 4}
                ]
            }),
            json!({
                "filename": "result_AWS Question 3 discussion.html",
                "question": null,
                "choices": ["a", "b"],
                "correct_answer": null,
                "user_data": null
            }),
            json!({
                "filename": "result_AWS question 7 discussion.html",
                "question": "Q7",
                "choices": ["a", "b", "c"],
                "correct_answer": "AC",
                "user_data": [
                    {"voted_answers": "AC", "vote_count": 20},
                    {"voted_answers": "A", "vote_count": 20}
                ]
            }),
        ]
    }

    #[test]
    fn audit_collects_statistics() {
        let report = audit(&documents(), fixed_now());

        assert_eq!(report.total_questions, 3);
        assert_eq!(report.malformed_records, 0);
        assert_eq!(report.question_numbers, vec![3, 7, 12]);
        assert_eq!(report.null_counts.get("question"), Some(&1));
        assert_eq!(report.null_counts.get("user_data"), Some(&1));
        assert_eq!(report.null_counts.get("correct_answer"), Some(&1));
        assert!(!report.null_counts.contains_key("filename"));

        assert_eq!(report.choice_stats.min, 2);
        assert_eq!(report.choice_stats.max, 4);
        assert!((report.choice_stats.avg - 3.0).abs() < f64::EPSILON);

        let voting = &report.voting_stats;
        assert_eq!(voting.total_votes, 54);
        assert_eq!(voting.questions_with_votes, 2);
        assert_eq!(voting.highest_vote_count, 40);
        assert_eq!(
            voting.highest_voted_question.as_deref(),
            Some("result_AWS question 7 discussion.html")
        );
        assert_eq!(voting.per_question[1].votes, 0);

        assert_eq!(report.accepted_answer_histogram.get("A"), Some(&1));
        assert_eq!(report.accepted_answer_histogram.get("B"), Some(&1));
        assert_eq!(report.accepted_answer_histogram.get("C"), Some(&1));
        assert_eq!(report.site_answer_distribution.get("AC"), Some(&1));
    }

    #[test]
    fn invalid_vote_entry_keeps_record_out_of_histogram() {
        let docs = vec![json!({
            "filename": "question 5.html",
            "question": "Q5",
            "choices": ["a", "b"],
            "user_data": [
                {"voted_answers": "A?", "vote_count": 50},
                {"voted_answers": "B", "vote_count": 1}
            ]
        })];

        let report = audit(&docs, fixed_now());
        assert!(report.accepted_answer_histogram.is_empty());
        assert_eq!(report.malformed_records, 1);
        assert_eq!(report.voting_stats.total_votes, 51);

        let load = QuestionBank::load_json(docs);
        assert_eq!(load.malformed_count(), report.malformed_records);
    }

    #[test]
    fn undecodable_documents_are_counted() {
        let docs = vec![
            json!({"filename": "question 1.html", "question": "Q1", "choices": 5}),
            json!({"filename": "question 2.html", "question": "Q2", "choices": ["a"]}),
            json!("not a record"),
        ];

        let report = audit(&docs, fixed_now());
        assert_eq!(report.total_questions, 3);
        assert_eq!(report.malformed_records, 2);
        assert_eq!(report.question_numbers, vec![1, 2]);
        assert_eq!(report.null_counts.get("filename"), Some(&1));
        assert_eq!(report.choice_stats.min, 1);
        assert_eq!(report.voting_stats.per_question.len(), 1);
    }

    #[test]
    fn empty_bank_has_zeroed_stats() {
        let report = audit(&[], fixed_now());
        assert_eq!(report.total_questions, 0);
        assert_eq!(report.choice_stats.min, 0);
        assert!(report.voting_stats.highest_voted_question.is_none());
    }

    #[test]
    fn report_serializes_as_document() {
        let report = audit(&documents(), fixed_now());
        let doc = serde_json::to_value(&report).unwrap();
        assert_eq!(doc["total_questions"], 3);
        assert_eq!(doc["malformed_records"], 0);
        assert_eq!(doc["voting_stats"]["highest_vote_count"], 40);
        assert_eq!(doc["generated_at"], "2023-11-14T22:13:20Z");
    }
}
