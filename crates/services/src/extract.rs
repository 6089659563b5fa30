//! Turn saved discussion pages into raw question records.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use quiz_core::model::{QuestionBank, RawQuestionRecord, RawVote};
use storage::pages::SourcePage;

use crate::error::ExtractError;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static QUESTION_BODY: LazyLock<Selector> = LazyLock::new(|| selector("div.question-body"));
static QUESTION_TEXT: LazyLock<Selector> = LazyLock::new(|| selector("p.card-text"));
static CHOICES: LazyLock<Selector> =
    LazyLock::new(|| selector("div.question-choices-container"));
static CHOICE_ITEM: LazyLock<Selector> = LazyLock::new(|| selector("li.multi-choice-item"));
static CORRECT_ANSWER: LazyLock<Selector> = LazyLock::new(|| selector("span.correct-answer"));
static VOTE_TALLY: LazyLock<Selector> = LazyLock::new(|| selector("div.voted-answers-tally"));
static TALLY_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"script[type="application/json"]"#));

/// Text of an element with each text node trimmed and empty nodes dropped.
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Extract one record from a discussion page.
///
/// Only the first question body, choice list, answer span and vote tally on
/// the page are read. Missing parts stay empty in the record.
///
/// # Errors
///
/// Returns `ExtractError::VoteTally` if the page embeds a vote tally that is
/// not a JSON list of votes.
pub fn extract_record(filename: &str, html: &str) -> Result<RawQuestionRecord, ExtractError> {
    let document = Html::parse_document(html);

    let question = document
        .select(&QUESTION_BODY)
        .next()
        .and_then(|body| body.select(&QUESTION_TEXT).next())
        .map(stripped_text);

    let choices = document
        .select(&CHOICES)
        .next()
        .map(|list| list.select(&CHOICE_ITEM).map(stripped_text).collect())
        .unwrap_or_default();

    let correct_answer = document.select(&CORRECT_ANSWER).next().map(stripped_text);

    let user_data = match document
        .select(&VOTE_TALLY)
        .next()
        .and_then(|tally| tally.select(&TALLY_SCRIPT).next())
    {
        Some(script) => {
            let body: String = script.text().collect();
            let votes: Vec<RawVote> =
                serde_json::from_str(&body).map_err(|source| ExtractError::VoteTally {
                    filename: filename.to_owned(),
                    source,
                })?;
            Some(votes)
        }
        None => None,
    };

    Ok(RawQuestionRecord {
        filename: Some(filename.to_owned()),
        question,
        choices,
        correct_answer,
        user_data,
    })
}

/// Records extracted from a batch of pages.
#[derive(Debug)]
pub struct Extraction {
    pub records: Vec<RawQuestionRecord>,
    pub failed: Vec<ExtractError>,
}

impl Extraction {
    /// Number of records the bank loader would turn into questions.
    #[must_use]
    pub fn usable_questions(&self) -> usize {
        QuestionBank::load(self.records.iter().cloned()).bank.len()
    }
}

/// Extract every page in order, skipping pages that fail.
#[must_use]
pub fn extract_pages(pages: impl IntoIterator<Item = SourcePage>) -> Extraction {
    let mut records = Vec::new();
    let mut failed = Vec::new();
    for page in pages {
        match extract_record(&page.filename, &page.html) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(error = %err, "skipped page");
                failed.push(err);
            }
        }
    }
    info!(records = records.len(), failed = failed.len(), "extracted pages");
    Extraction { records, failed }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <div class="question-body">
    <p class="card-text">
      Which service stores objects?
      <br>
      Pick one.
    </p>
    <div class="question-choices-container">
      <ul>
        <li class="multi-choice-item"><span class="multi-choice-letter">A.</span> EBS</li>
        <li class="multi-choice-item"><span class="multi-choice-letter">B.</span> S3</li>
        <li class="multi-choice-item most-voted"><span class="multi-choice-letter">C.</span> EFS</li>
      </ul>
    </div>
    <p class="card-text">Correct Answer: <span class="correct-answer">B</span></p>
    <div class="voted-answers-tally d-none">
      <script type="application/json">
        [{"voted_answers": "B", "vote_count": 12, "is_most_voted": true},
         {"voted_answers": "C", "vote_count": 2, "is_most_voted": false}]
      </script>
    </div>
  </div>
</body></html>"#;

    #[test]
    fn page_fields_are_extracted() {
        let record = extract_record("question 4 discussion.html", PAGE).unwrap();

        assert_eq!(record.filename.as_deref(), Some("question 4 discussion.html"));
        assert_eq!(
            record.question.as_deref(),
            Some("Which service stores objects?Pick one.")
        );
        assert_eq!(record.choices, vec!["A.EBS", "B.S3", "C.EFS"]);
        assert_eq!(record.correct_answer.as_deref(), Some("B"));
        let votes = record.votes();
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].voted_answers, "B");
        assert_eq!(votes[0].vote_count, 12);
        assert_eq!(votes[0].is_most_voted, Some(true));
    }

    #[test]
    fn missing_sections_stay_empty() {
        let record = extract_record("blank.html", "<html><body><p>nothing</p></body></html>").unwrap();
        assert!(record.question.is_none());
        assert!(record.choices.is_empty());
        assert!(record.correct_answer.is_none());
        assert!(record.user_data.is_none());
    }

    #[test]
    fn bad_tally_skips_only_that_page() {
        let broken = PAGE.replace(r#""vote_count": 2"#, r#""vote_count": "two""#);
        let extraction = extract_pages(vec![
            SourcePage {
                filename: "question 1.html".to_owned(),
                html: PAGE.to_owned(),
            },
            SourcePage {
                filename: "question 2.html".to_owned(),
                html: broken,
            },
            SourcePage {
                filename: "question 3.html".to_owned(),
                html: "<p>no question here</p>".to_owned(),
            },
        ]);

        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.failed.len(), 1);
        assert!(matches!(
            &extraction.failed[0],
            ExtractError::VoteTally { filename, .. } if filename == "question 2.html"
        ));
        assert_eq!(extraction.usable_questions(), 1);
    }

    #[test]
    fn extracted_record_serializes_in_bank_shape() {
        let record = extract_record("question 4 discussion.html", PAGE).unwrap();
        let doc = serde_json::to_value(&record).unwrap();
        assert_eq!(doc["question"], "Which service stores objects?Pick one.");
        assert_eq!(doc["user_data"][1]["vote_count"], 2);

        let load = QuestionBank::load_json(vec![doc]);
        assert_eq!(load.bank.len(), 1);
        assert_eq!(load.bank.get(0).unwrap().choices().len(), 3);
    }
}
