use rand::Rng;
use rand::rng;
use tracing::info;

use quiz_core::Clock;
use quiz_core::model::BankId;

use super::plan::{RosterMode, select_with_rng};
use super::registry::SessionRegistry;
use super::session::QuizSession;
use crate::audit::{AuditReport, audit};
use crate::bank_service::BankService;
use crate::error::QuizLoopError;

/// Orchestrates bank loading, roster selection and session start.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    banks: BankService,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, banks: BankService) -> Self {
        Self { clock, banks }
    }

    #[must_use]
    pub fn banks(&self) -> &BankService {
        &self.banks
    }

    /// Load a bank and start a quiz over a roster drawn from it.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoopError::Bank` if the bank cannot be loaded, or
    /// `QuizLoopError::Quiz` if the drawn roster is empty.
    pub async fn start_session(
        &self,
        bank_id: &BankId,
        mode: RosterMode,
    ) -> Result<QuizSession, QuizLoopError> {
        self.start_session_with_rng(bank_id, mode, &mut rng()).await
    }

    /// Same as `start_session` with a caller-supplied random source.
    ///
    /// # Errors
    ///
    /// See `start_session`.
    pub async fn start_session_with_rng<R: Rng + ?Sized>(
        &self,
        bank_id: &BankId,
        mode: RosterMode,
        rng: &mut R,
    ) -> Result<QuizSession, QuizLoopError> {
        let loaded = self.banks.load(bank_id).await?;
        let plan = select_with_rng(&loaded.bank, mode, rng);
        info!(
            bank = %bank_id,
            questions = plan.total(),
            sampled = plan.sampled,
            window = ?plan.window,
            "roster selected"
        );

        let mut session = QuizSession::new().with_clock(self.clock);
        session.start(plan.questions)?;
        Ok(session)
    }

    /// Load a bank and open a registry serving many sessions over it.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoopError::Bank` if the bank cannot be loaded.
    pub async fn open_registry(&self, bank_id: &BankId) -> Result<SessionRegistry, QuizLoopError> {
        let loaded = self.banks.load(bank_id).await?;
        Ok(SessionRegistry::new(loaded.bank).with_clock(self.clock))
    }

    /// Load a bank and audit every source document it holds.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoopError::Bank` if the bank cannot be loaded.
    pub async fn audit(&self, bank_id: &BankId) -> Result<AuditReport, QuizLoopError> {
        let loaded = self.banks.load(bank_id).await?;
        Ok(audit(&loaded.documents, self.clock.now()))
    }
}
