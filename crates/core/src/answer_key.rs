//! Derivation of the accepted answer set from community vote data.

use std::collections::BTreeSet;
use std::fmt;

use crate::model::{ChoiceLetter, Question, VoteRecord};

/// Letters accepted as correct for a question.
///
/// An empty key means the source had no vote data; only an empty selection
/// matches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AnswerKey(BTreeSet<ChoiceLetter>);

impl AnswerKey {
    #[must_use]
    pub fn letters(&self) -> &BTreeSet<ChoiceLetter> {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, letter: ChoiceLetter) -> bool {
        self.0.contains(&letter)
    }

    /// Exact set match; partial credit does not exist.
    #[must_use]
    pub fn matches(&self, selected: &BTreeSet<ChoiceLetter>) -> bool {
        &self.0 == selected
    }
}

impl FromIterator<ChoiceLetter> for AnswerKey {
    fn from_iter<T: IntoIterator<Item = ChoiceLetter>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, letter) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{letter}")?;
        }
        Ok(())
    }
}

/// Resolves the answer key of a question.
#[must_use]
pub fn resolve(question: &Question) -> AnswerKey {
    resolve_votes(question.votes())
}

/// Letters of the most-voted record; the first record wins a tie.
#[must_use]
pub fn resolve_votes(votes: &[VoteRecord]) -> AnswerKey {
    let mut best: Option<&VoteRecord> = None;
    for vote in votes {
        match best {
            Some(current) if vote.count() <= current.count() => {}
            _ => best = Some(vote),
        }
    }
    best.map(|v| v.letters().iter().copied().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    fn letters(raw: &str) -> Vec<ChoiceLetter> {
        ChoiceLetter::parse_many(raw).unwrap()
    }

    fn question(votes: Vec<VoteRecord>) -> Question {
        Question::new(
            QuestionId::ordinal(1),
            "Q",
            vec!["a".into(), "b".into(), "c".into()],
            votes,
        )
        .unwrap()
    }

    #[test]
    fn empty_votes_resolve_to_empty_key() {
        let key = resolve(&question(Vec::new()));
        assert!(key.is_empty());
        assert!(key.matches(&BTreeSet::new()));
    }

    #[test]
    fn tie_goes_to_first_record() {
        let q = question(vec![
            VoteRecord::new(letters("A"), 5),
            VoteRecord::new(letters("B"), 5),
        ]);
        let key = resolve(&q);
        assert_eq!(key, letters("A").into_iter().collect::<AnswerKey>());
    }

    #[test]
    fn highest_count_wins_regardless_of_order() {
        let q = question(vec![
            VoteRecord::new(letters("A"), 2),
            VoteRecord::new(letters("BC"), 9),
            VoteRecord::new(letters("C"), 4),
        ]);
        let key = resolve(&q);
        assert_eq!(key.to_string(), "B, C");
        assert!(key.contains(letters("C")[0]));
    }

    #[test]
    fn resolve_is_deterministic() {
        let q = question(vec![
            VoteRecord::new(letters("AB"), 3),
            VoteRecord::new(letters("B"), 3),
        ]);
        assert_eq!(resolve(&q), resolve(&q));
    }

    #[test]
    fn all_zero_counts_pick_first() {
        let q = question(vec![
            VoteRecord::new(letters("C"), 0),
            VoteRecord::new(letters("A"), 0),
        ]);
        assert_eq!(resolve(&q).to_string(), "C");
    }
}
