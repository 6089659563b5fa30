use std::sync::Arc;

use tracing::{info, warn};

use quiz_core::model::{BankId, BankLoad, QuestionBank, RejectedRecord};
use storage::repository::BankRepository;

use crate::error::BankServiceError;

/// A bank loaded from storage, with the source documents it was built from.
#[derive(Debug, Clone)]
pub struct LoadedBank {
    pub id: BankId,
    pub bank: Arc<QuestionBank>,
    /// Every source document as stored, including ones that failed to decode.
    pub documents: Vec<serde_json::Value>,
    pub rejected: Vec<RejectedRecord>,
}

/// Resolves bank identifiers to question banks.
#[derive(Clone)]
pub struct BankService {
    repo: Arc<dyn BankRepository>,
}

impl BankService {
    #[must_use]
    pub fn new(repo: Arc<dyn BankRepository>) -> Self {
        Self { repo }
    }

    /// # Errors
    ///
    /// Returns `BankServiceError::Storage` if vendors cannot be listed.
    pub async fn vendors(&self) -> Result<Vec<String>, BankServiceError> {
        Ok(self.repo.list_vendors().await?)
    }

    /// # Errors
    ///
    /// Returns `BankServiceError::Storage` if the vendor is unknown or unreadable.
    pub async fn banks(&self, vendor: &str) -> Result<Vec<BankId>, BankServiceError> {
        Ok(self.repo.list_banks(vendor).await?)
    }

    /// Load a bank, skipping malformed and ineligible records.
    ///
    /// Skipped records are logged and returned in `LoadedBank::rejected`; they
    /// never fail the load.
    ///
    /// # Errors
    ///
    /// Returns `BankServiceError::Storage` if the bank cannot be read at all.
    pub async fn load(&self, id: &BankId) -> Result<LoadedBank, BankServiceError> {
        let documents = self.repo.load_records(id).await?;
        let load = QuestionBank::load_json(documents.iter().cloned());
        for skipped in &load.rejected {
            warn!(bank = %id, position = skipped.position, reason = %skipped.reason, "skipped record");
        }
        info!(
            bank = %id,
            questions = load.bank.len(),
            malformed = load.malformed_count(),
            ineligible = load.ineligible_count(),
            "loaded question bank"
        );
        let BankLoad { bank, rejected } = load;

        Ok(LoadedBank {
            id: id.clone(),
            bank: Arc::new(bank),
            documents,
            rejected,
        })
    }
}
