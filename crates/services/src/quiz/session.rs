use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use quiz_core::model::{ChoiceLetter, Question};
use quiz_core::{Clock, SelectionSet, resolve};

use super::progress::{
    Outcome, QuestionReview, QuizProgress, QuizSummary, Score, SubmitResult,
};
use crate::error::QuizError;

//
// ─── LIFECYCLE ─────────────────────────────────────────────────────────────────
//

/// Coarse state of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lifecycle::NotStarted => "not started",
            Lifecycle::InProgress => "in progress",
            Lifecycle::Completed => "completed",
        })
    }
}

/// Session operations, named in `InvalidTransition` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Start,
    ToggleChoice,
    Submit,
    Seek,
    Advance,
    Complete,
    Score,
    Summary,
    Restart,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Start => "start",
            Operation::ToggleChoice => "toggle a choice",
            Operation::Submit => "submit",
            Operation::Seek => "seek",
            Operation::Advance => "advance",
            Operation::Complete => "complete",
            Operation::Score => "read the score",
            Operation::Summary => "summarize",
            Operation::Restart => "restart",
        })
    }
}

/// Result of `QuizSession::advance`.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Moved(usize),
    Completed(QuizSummary),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Interactive quiz over a roster of questions.
///
/// Navigation is free: the user may seek anywhere in the roster. Choices may
/// be toggled and submitted on the current question or on any question that
/// was visited earlier; unvisited questions are rejected with `NotVisited`.
///
/// The score is derived from the `graded` set, so submitting the same correct
/// answer twice never counts twice. `attempts` counts every submit call.
#[derive(Clone, Default)]
pub struct QuizSession {
    clock: Clock,
    lifecycle: Lifecycle,
    roster: Vec<Arc<Question>>,
    position: usize,
    selections: BTreeMap<usize, SelectionSet>,
    graded: BTreeSet<usize>,
    outcomes: BTreeMap<usize, Outcome>,
    visited: BTreeSet<usize>,
    attempts: u32,
    ended_early: bool,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Begin the quiz over `roster`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless the session is not started.
    /// Returns `QuizError::EmptyRoster` if `roster` is empty; the session stays not started.
    pub fn start(&mut self, roster: Vec<Arc<Question>>) -> Result<(), QuizError> {
        self.ensure(Operation::Start, &[Lifecycle::NotStarted])?;
        if roster.is_empty() {
            return Err(QuizError::EmptyRoster);
        }

        self.reset();
        self.roster = roster;
        self.visited.insert(0);
        self.started_at = Some(self.clock.now());
        self.lifecycle = Lifecycle::InProgress;
        debug!(questions = self.roster.len(), "quiz started");
        Ok(())
    }

    /// Flip `letter` in the selection of question `index`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless in progress, `OutOfRange`
    /// for a bad index, `NotVisited` for an unvisited question, and
    /// `ChoiceOutOfRange` if the question has no such choice.
    pub fn toggle_choice(
        &mut self,
        index: usize,
        letter: ChoiceLetter,
    ) -> Result<&SelectionSet, QuizError> {
        self.ensure(Operation::ToggleChoice, &[Lifecycle::InProgress])?;
        self.ensure_reachable(index)?;
        let choices = self.roster[index].choices().len();
        if !self.roster[index].has_choice(letter) {
            return Err(QuizError::ChoiceOutOfRange { letter, choices });
        }

        let selection = self.selections.entry(index).or_default();
        let on = selection.toggle(letter);
        debug!(index, %letter, on, "choice toggled");
        Ok(&*selection)
    }

    /// Grade the current selection of question `index` against its answer key.
    ///
    /// # Errors
    ///
    /// Same conditions as `toggle_choice`, minus the choice check.
    pub fn submit(&mut self, index: usize) -> Result<SubmitResult, QuizError> {
        self.ensure(Operation::Submit, &[Lifecycle::InProgress])?;
        self.ensure_reachable(index)?;

        let answer_key = resolve(&self.roster[index]);
        let selection = self.selections.get(&index).cloned().unwrap_or_default();
        let outcome = if answer_key.matches(selection.letters()) {
            self.graded.insert(index);
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        self.attempts = self.attempts.saturating_add(1);
        self.outcomes.insert(index, outcome);
        debug!(index, ?outcome, attempts = self.attempts, "answer submitted");

        Ok(SubmitResult {
            index,
            outcome,
            answer_key,
            selection,
        })
    }

    /// Jump to `index`, clamped into the roster. Returns the new position.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless in progress.
    pub fn seek(&mut self, index: usize) -> Result<usize, QuizError> {
        self.ensure(Operation::Seek, &[Lifecycle::InProgress])?;
        let position = index.min(self.roster.len().saturating_sub(1));
        self.position = position;
        self.visited.insert(position);
        Ok(position)
    }

    /// Move forward one question, staying on the last one at the end.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless in progress.
    pub fn next(&mut self) -> Result<usize, QuizError> {
        self.seek(self.position.saturating_add(1))
    }

    /// Move back one question, staying on the first one at the start.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless in progress.
    pub fn previous(&mut self) -> Result<usize, QuizError> {
        self.seek(self.position.saturating_sub(1))
    }

    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless in progress.
    pub fn first(&mut self) -> Result<usize, QuizError> {
        self.seek(0)
    }

    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless in progress.
    pub fn last(&mut self) -> Result<usize, QuizError> {
        self.seek(self.roster.len().saturating_sub(1))
    }

    /// Linear flow: go to the next question, or finish the quiz on the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless in progress.
    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        self.ensure(Operation::Advance, &[Lifecycle::InProgress])?;
        if self.position + 1 >= self.roster.len() {
            return self.complete(true).map(Advance::Completed);
        }
        self.next().map(Advance::Moved)
    }

    /// Whether finishing now would leave questions behind.
    ///
    /// The UI should ask the user before calling `complete` when this is true.
    #[must_use]
    pub fn requires_confirmation(&self) -> bool {
        self.lifecycle == Lifecycle::InProgress
            && (self.position + 1 < self.roster.len() || self.visited.len() < self.roster.len())
    }

    /// Finish the quiz.
    ///
    /// Completion is unconditional once called; `force` only records that the
    /// caller confirmed an early exit.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless in progress.
    pub fn complete(&mut self, force: bool) -> Result<QuizSummary, QuizError> {
        self.ensure(Operation::Complete, &[Lifecycle::InProgress])?;
        self.ended_early = self.requires_confirmation();
        self.completed_at = Some(self.clock.now());
        self.lifecycle = Lifecycle::Completed;
        debug!(force, ended_early = self.ended_early, "quiz completed");
        self.summary()
    }

    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` before the quiz has started.
    pub fn score(&self) -> Result<Score, QuizError> {
        self.ensure(
            Operation::Score,
            &[Lifecycle::InProgress, Lifecycle::Completed],
        )?;
        Ok(Score {
            correct: self.graded.len(),
            total: self.roster.len(),
        })
    }

    /// Correct answers per submit action, `None` before the first submit.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> Option<f64> {
        (self.attempts > 0).then(|| self.graded.len() as f64 / f64::from(self.attempts))
    }

    /// Summary of a completed quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless completed.
    pub fn summary(&self) -> Result<QuizSummary, QuizError> {
        let invalid = QuizError::InvalidTransition {
            operation: Operation::Summary,
            state: self.lifecycle,
        };
        if self.lifecycle != Lifecycle::Completed {
            return Err(invalid);
        }
        let (Some(started_at), Some(completed_at)) = (self.started_at, self.completed_at) else {
            return Err(invalid);
        };
        Ok(QuizSummary {
            score: self.score()?,
            attempts: self.attempts,
            accuracy: self.accuracy(),
            ended_early: self.ended_early,
            started_at,
            completed_at,
        })
    }

    /// Drop all state, including the roster. `start` must be called again.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if the quiz never started.
    pub fn restart(&mut self) -> Result<(), QuizError> {
        self.ensure(
            Operation::Restart,
            &[Lifecycle::InProgress, Lifecycle::Completed],
        )?;
        self.reset();
        debug!("quiz restarted");
        Ok(())
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn roster(&self) -> &[Arc<Question>] {
        &self.roster
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Arc<Question>> {
        self.roster.get(self.position)
    }

    /// Selection for question `index`; empty if never touched.
    #[must_use]
    pub fn selection(&self, index: usize) -> SelectionSet {
        self.selections.get(&index).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn graded(&self) -> &BTreeSet<usize> {
        &self.graded
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn outcome(&self, index: usize) -> Option<Outcome> {
        self.outcomes.get(&index).copied()
    }

    #[must_use]
    pub fn is_visited(&self, index: usize) -> bool {
        self.visited.contains(&index)
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            lifecycle: self.lifecycle,
            position: self.position,
            total: self.roster.len(),
            visited: self.visited.len(),
            submitted: self.outcomes.len(),
            correct: self.graded.len(),
            attempts: self.attempts,
        }
    }

    /// One review line per roster question, in roster order.
    #[must_use]
    pub fn review(&self) -> Vec<QuestionReview> {
        self.roster
            .iter()
            .enumerate()
            .map(|(index, question)| QuestionReview {
                index,
                question_id: question.id().clone(),
                selection: self.selection(index),
                answer_key: resolve(question),
                outcome: self.outcome(index),
            })
            .collect()
    }

    fn ensure(&self, operation: Operation, allowed: &[Lifecycle]) -> Result<(), QuizError> {
        if allowed.contains(&self.lifecycle) {
            Ok(())
        } else {
            Err(QuizError::InvalidTransition {
                operation,
                state: self.lifecycle,
            })
        }
    }

    fn ensure_reachable(&self, index: usize) -> Result<(), QuizError> {
        if index >= self.roster.len() {
            return Err(QuizError::OutOfRange {
                index,
                len: self.roster.len(),
            });
        }
        if !self.visited.contains(&index) {
            return Err(QuizError::NotVisited { index });
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::new().with_clock(self.clock);
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("lifecycle", &self.lifecycle)
            .field("roster_len", &self.roster.len())
            .field("position", &self.position)
            .field("graded", &self.graded)
            .field("attempts", &self.attempts)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
