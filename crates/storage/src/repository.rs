use async_trait::async_trait;
use quiz_core::model::BankId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("connection error: {0}")]
    Connection(String),
}

/// Repository contract for question banks.
///
/// Records come back as untyped JSON documents, one per question, so a single
/// malformed record can be rejected by the loader without failing the batch.
#[async_trait]
pub trait BankRepository: Send + Sync {
    /// List known vendors, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be enumerated.
    async fn list_vendors(&self) -> Result<Vec<String>, StorageError>;

    /// List banks published under a vendor, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the vendor is unknown.
    async fn list_banks(&self, vendor: &str) -> Result<Vec<BankId>, StorageError>;

    /// Fetch the raw records of one bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn load_records(&self, id: &BankId) -> Result<Vec<serde_json::Value>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    banks: Arc<Mutex<HashMap<BankId, Vec<serde_json::Value>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) a bank's records.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_bank(
        &self,
        id: BankId,
        records: Vec<serde_json::Value>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(id, records);
        Ok(())
    }
}

#[async_trait]
impl BankRepository for InMemoryRepository {
    async fn list_vendors(&self) -> Result<Vec<String>, StorageError> {
        let guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut vendors: Vec<String> = guard.keys().map(|id| id.vendor().to_owned()).collect();
        vendors.sort();
        vendors.dedup();
        Ok(vendors)
    }

    async fn list_banks(&self, vendor: &str) -> Result<Vec<BankId>, StorageError> {
        let guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut banks: Vec<BankId> = guard
            .keys()
            .filter(|id| id.vendor() == vendor)
            .cloned()
            .collect();
        if banks.is_empty() {
            return Err(StorageError::NotFound(vendor.to_owned()));
        }
        banks.sort();
        Ok(banks)
    }

    async fn load_records(&self, id: &BankId) -> Result<Vec<serde_json::Value>, StorageError> {
        let guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }
}

/// Bank repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub banks: Arc<dyn BankRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            banks: Arc::new(InMemoryRepository::new()),
        }
    }
}
