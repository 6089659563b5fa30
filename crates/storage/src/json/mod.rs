use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::BankId;
use serde::Serialize;
use tokio::fs;
use tracing::debug;

use crate::repository::{BankRepository, Storage, StorageError};

const BANK_EXTENSION: &str = "json";

/// Question banks stored as `<root>/<vendor>/<exam>.json`, each a JSON array of records.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    root: PathBuf,
}

impl JsonFileRepository {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn bank_path(&self, id: &BankId) -> PathBuf {
        self.root
            .join(id.vendor())
            .join(format!("{}.{BANK_EXTENSION}", id.exam()))
    }

    async fn read_dir_sorted(&self, dir: &Path) -> Result<Vec<(String, bool)>, StorageError> {
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| io_error(dir, &e))?;
        let mut out = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(dir, &e))? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let is_dir = entry
                .file_type()
                .await
                .map_err(|e| io_error(dir, &e))?
                .is_dir();
            out.push((name, is_dir));
        }
        out.sort();
        Ok(out)
    }
}

pub(crate) fn io_error(path: &Path, err: &std::io::Error) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound(path.display().to_string())
    } else {
        StorageError::Io(format!("{}: {err}", path.display()))
    }
}

#[async_trait]
impl BankRepository for JsonFileRepository {
    async fn list_vendors(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.read_dir_sorted(&self.root).await?;
        Ok(entries
            .into_iter()
            .filter(|(_, is_dir)| *is_dir)
            .map(|(name, _)| name)
            .collect())
    }

    async fn list_banks(&self, vendor: &str) -> Result<Vec<BankId>, StorageError> {
        let dir = self.root.join(vendor);
        let entries = self.read_dir_sorted(&dir).await?;
        Ok(entries
            .into_iter()
            .filter(|(_, is_dir)| !*is_dir)
            .filter_map(|(name, _)| {
                let exam = name.strip_suffix(BANK_EXTENSION)?.strip_suffix('.')?;
                BankId::new(vendor, exam).ok()
            })
            .collect())
    }

    async fn load_records(&self, id: &BankId) -> Result<Vec<serde_json::Value>, StorageError> {
        let path = self.bank_path(id);
        let bytes = fs::read(&path).await.map_err(|e| io_error(&path, &e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "read bank file");

        let document: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Serialization(format!("{}: {e}", path.display())))?;
        match document {
            serde_json::Value::Array(records) => Ok(records),
            other => Err(StorageError::Serialization(format!(
                "{}: expected a JSON array of records, found {}",
                path.display(),
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Write a pretty-printed JSON document, creating parent directories.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if `value` cannot be encoded, or
/// `StorageError::Io` if the file cannot be written.
pub async fn write_json_report<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), StorageError> {
    let mut body =
        serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    body.push(b'\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, &e))?;
    }
    fs::write(path, body).await.map_err(|e| io_error(path, &e))?;
    debug!(path = %path.display(), "wrote report");
    Ok(())
}

impl Storage {
    /// Build a `Storage` backed by a directory of JSON bank files.
    #[must_use]
    pub fn json_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            banks: Arc::new(JsonFileRepository::new(root)),
        }
    }
}
