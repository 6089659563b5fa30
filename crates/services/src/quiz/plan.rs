use std::ops::Range;
use std::sync::Arc;

use rand::Rng;
use rand::rng;
use rand::seq::index;

use quiz_core::model::{Question, QuestionBank};

/// How the roster of a quiz is drawn from a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RosterMode {
    /// Every question, in bank order.
    #[default]
    Full,
    /// A uniform random sample of at most `n` questions.
    Count(usize),
    /// Questions `start..end` (clamped), optionally sampled down to `count`.
    Range {
        start: usize,
        end: usize,
        count: Option<usize>,
    },
}

impl RosterMode {
    /// Combine optional count/range options the way the CLI exposes them.
    #[must_use]
    pub fn from_options(count: Option<usize>, range: Option<(usize, usize)>) -> Self {
        match (count, range) {
            (count, Some((start, end))) => Self::Range { start, end, count },
            (Some(n), None) => Self::Count(n),
            (None, None) => Self::Full,
        }
    }
}

/// Selection result for a quiz build.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterPlan {
    pub questions: Vec<Arc<Question>>,
    /// Bank slice the questions were drawn from, after clamping.
    pub window: Range<usize>,
    pub sampled: bool,
}

impl RosterPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Draws a roster with the thread-local RNG.
#[must_use]
pub fn select(bank: &QuestionBank, mode: RosterMode) -> RosterPlan {
    select_with_rng(bank, mode, &mut rng())
}

/// Draws a roster from `bank`.
///
/// Sampling is uniform and without replacement; sampled questions keep their
/// bank order. Range bounds are clamped into the bank instead of rejected, and
/// an inverted range yields an empty plan.
pub fn select_with_rng<R: Rng + ?Sized>(
    bank: &QuestionBank,
    mode: RosterMode,
    rng: &mut R,
) -> RosterPlan {
    let len = bank.len();
    let (window, count) = match mode {
        RosterMode::Full => (0..len, None),
        RosterMode::Count(n) => (0..len, Some(n)),
        RosterMode::Range { start, end, count } => {
            let start = start.min(len);
            let end = end.min(len).max(start);
            (start..end, count)
        }
    };

    let pool = &bank.questions()[window.clone()];
    let (questions, sampled) = match count {
        Some(n) if n < pool.len() => (sample_in_order(pool, n, rng), true),
        _ => (pool.to_vec(), false),
    };

    RosterPlan {
        questions,
        window,
        sampled,
    }
}

fn sample_in_order<R: Rng + ?Sized>(
    pool: &[Arc<Question>],
    amount: usize,
    rng: &mut R,
) -> Vec<Arc<Question>> {
    let mut picked = index::sample(rng, pool.len(), amount).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| Arc::clone(&pool[i])).collect()
}
