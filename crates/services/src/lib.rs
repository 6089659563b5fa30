#![forbid(unsafe_code)]

pub mod audit;
pub mod bank_service;
pub mod error;
pub mod extract;
pub mod quiz;

pub use quiz_core::Clock;

pub use audit::{AuditReport, audit};
pub use bank_service::{BankService, LoadedBank};
pub use error::{BankServiceError, ExtractError, QuizError, QuizLoopError};
pub use extract::{Extraction, extract_pages, extract_record};
pub use quiz::{
    Advance, Lifecycle, Outcome, QuizLoopService, QuizSession, RosterMode, Score, SessionRegistry,
};
