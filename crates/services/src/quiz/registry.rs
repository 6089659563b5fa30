use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use quiz_core::Clock;
use quiz_core::model::{QuestionBank, SessionId};

use super::plan::{RosterMode, select_with_rng};
use super::session::QuizSession;
use crate::error::QuizError;

/// One `QuizSession` per user identity, all reading the same bank.
///
/// The bank is shared read-only; each session owns its own mutable state.
#[derive(Debug)]
pub struct SessionRegistry {
    bank: Arc<QuestionBank>,
    clock: Clock,
    sessions: HashMap<SessionId, QuizSession>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self {
            bank,
            clock: Clock::default(),
            sessions: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn bank(&self) -> &Arc<QuestionBank> {
        &self.bank
    }

    /// Register a new, not yet started session.
    pub fn open(&mut self) -> SessionId {
        let id = SessionId::new_v4();
        self.sessions
            .insert(id, QuizSession::new().with_clock(self.clock));
        debug!(session = %id, open = self.sessions.len(), "session opened");
        id
    }

    /// Draw a roster from the shared bank and start session `id` on it.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownSession`, or any error from `QuizSession::start`.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        id: SessionId,
        mode: RosterMode,
        rng: &mut R,
    ) -> Result<&QuizSession, QuizError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(QuizError::UnknownSession(id))?;
        let plan = select_with_rng(&self.bank, mode, rng);
        session.start(plan.questions)?;
        Ok(&*session)
    }

    /// # Errors
    ///
    /// Returns `QuizError::UnknownSession` if `id` is not registered.
    pub fn get(&self, id: SessionId) -> Result<&QuizSession, QuizError> {
        self.sessions.get(&id).ok_or(QuizError::UnknownSession(id))
    }

    /// # Errors
    ///
    /// Returns `QuizError::UnknownSession` if `id` is not registered.
    pub fn get_mut(&mut self, id: SessionId) -> Result<&mut QuizSession, QuizError> {
        self.sessions
            .get_mut(&id)
            .ok_or(QuizError::UnknownSession(id))
    }

    /// Remove a session, returning its final state.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownSession` if `id` is not registered.
    pub fn close(&mut self, id: SessionId) -> Result<QuizSession, QuizError> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(QuizError::UnknownSession(id))?;
        debug!(session = %id, open = self.sessions.len(), "session closed");
        Ok(session)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{ChoiceLetter, Question, QuestionId, VoteRecord};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::quiz::Lifecycle;

    fn shared_bank() -> Arc<QuestionBank> {
        let a = ChoiceLetter::from_char('A').unwrap();
        Arc::new(QuestionBank::from_questions((1..=3).map(|i| {
            Question::new(
                QuestionId::ordinal(i),
                format!("Q{i}"),
                vec!["x".into(), "y".into()],
                vec![VoteRecord::new([a], 1)],
            )
            .unwrap()
        })))
    }

    #[test]
    fn sessions_are_isolated() {
        let mut registry = SessionRegistry::new(shared_bank());
        let mut rng = StdRng::seed_from_u64(0);
        let alice = registry.open();
        let bob = registry.open();
        registry.start(alice, RosterMode::Full, &mut rng).unwrap();
        registry.start(bob, RosterMode::Full, &mut rng).unwrap();

        let a = ChoiceLetter::from_char('A').unwrap();
        let session = registry.get_mut(alice).unwrap();
        session.toggle_choice(0, a).unwrap();
        session.submit(0).unwrap();

        assert_eq!(registry.get(alice).unwrap().graded().len(), 1);
        assert!(registry.get(bob).unwrap().graded().is_empty());
        assert!(registry.get(bob).unwrap().selection(0).is_empty());
        assert_eq!(Arc::strong_count(registry.bank()), 1);
    }

    #[test]
    fn unknown_and_closed_sessions_are_reported() {
        let mut registry = SessionRegistry::new(shared_bank());
        let id = registry.open();
        assert_eq!(registry.len(), 1);

        let closed = registry.close(id).unwrap();
        assert_eq!(closed.lifecycle(), Lifecycle::NotStarted);
        assert!(registry.is_empty());
        assert_eq!(registry.get(id).unwrap_err(), QuizError::UnknownSession(id));
    }

    #[test]
    fn empty_roster_leaves_session_not_started() {
        let mut registry = SessionRegistry::new(shared_bank());
        let id = registry.open();
        let err = registry
            .start(id, RosterMode::Range { start: 2, end: 2, count: None }, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert_eq!(err, QuizError::EmptyRoster);
        assert_eq!(registry.get(id).unwrap().lifecycle(), Lifecycle::NotStarted);
    }
}
