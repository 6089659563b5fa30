use serde::{Deserialize, Serialize};

/// One record as produced by the extraction collaborator.
///
/// Field names follow the extractor's JSON output. Everything is optional at
/// this level; eligibility and validation happen in `Question::from_raw`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawQuestionRecord {
    #[serde(default)]
    pub filename: Option<String>,

    #[serde(default, alias = "prompt")]
    pub question: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub choices: Vec<String>,

    #[serde(default)]
    pub correct_answer: Option<String>,

    #[serde(default, alias = "voteRecords")]
    pub user_data: Option<Vec<RawVote>>,
}

/// One entry of the vote tally embedded in a discussion page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawVote {
    #[serde(default, alias = "selectedLetters")]
    pub voted_answers: String,

    #[serde(default, alias = "voteCount")]
    pub vote_count: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_most_voted: Option<bool>,
}

impl RawQuestionRecord {
    /// Votes as a slice; an absent tally is treated as empty.
    #[must_use]
    pub fn votes(&self) -> &[RawVote] {
        self.user_data.as_deref().unwrap_or(&[])
    }

    /// Sum of all vote counts, ignoring negative values.
    #[must_use]
    pub fn total_votes(&self) -> u64 {
        self.votes()
            .iter()
            .map(|v| u64::try_from(v.vote_count).unwrap_or(0))
            .sum()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
