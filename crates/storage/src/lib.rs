#![forbid(unsafe_code)]

pub mod json;
pub mod pages;
pub mod repository;

pub use json::{JsonFileRepository, write_json_report};
pub use pages::{SourcePage, read_html_pages};
pub use repository::{BankRepository, InMemoryRepository, Storage, StorageError};
