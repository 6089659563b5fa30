use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::json::io_error;
use crate::repository::StorageError;

const PAGE_EXTENSION: &str = "html";

/// A saved discussion page, keyed by its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage {
    pub filename: String,
    pub html: String,
}

/// Read every `*.html` file directly under `dir`, sorted by file name.
///
/// Subdirectories and other extensions are ignored.
///
/// # Errors
///
/// Returns `StorageError::NotFound` if `dir` does not exist, or
/// `StorageError::Io` if a page cannot be read as UTF-8 text.
pub async fn read_html_pages(dir: &Path) -> Result<Vec<SourcePage>, StorageError> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| io_error(dir, &e))?;
    let mut paths: Vec<(String, PathBuf)> = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(dir, &e))? {
        let path = entry.path();
        let is_page = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(PAGE_EXTENSION));
        if !is_page || !entry.file_type().await.map_err(|e| io_error(&path, &e))?.is_file() {
            continue;
        }
        paths.push((entry.file_name().to_string_lossy().into_owned(), path));
    }
    paths.sort();

    let mut pages = Vec::with_capacity(paths.len());
    for (filename, path) in paths {
        let html = fs::read_to_string(&path)
            .await
            .map_err(|e| io_error(&path, &e))?;
        debug!(path = %path.display(), bytes = html.len(), "read source page");
        pages.push(SourcePage { filename, html });
    }
    Ok(pages)
}
