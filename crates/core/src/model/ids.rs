use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a question within a bank.
///
/// Either the source identifier the extractor recorded (usually the page file
/// name) or the 1-based ordinal of the record in its source document.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a new `QuestionId` from a source identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates an ordinal identifier (`1`, `2`, ...).
    #[must_use]
    pub fn ordinal(ordinal: usize) -> Self {
        Self(ordinal.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Vendor/exam scoped identifier of a question bank, written `vendor/exam`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BankId {
    vendor: String,
    exam: String,
}

impl BankId {
    /// Creates a new `BankId`.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if either segment is empty or contains a `/`.
    pub fn new(vendor: impl Into<String>, exam: impl Into<String>) -> Result<Self, ParseIdError> {
        let vendor = vendor.into();
        let exam = exam.into();
        if !valid_segment(&vendor) || !valid_segment(&exam) {
            return Err(ParseIdError {
                kind: "BankId".to_string(),
            });
        }
        Ok(Self { vendor, exam })
    }

    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    #[must_use]
    pub fn exam(&self) -> &str {
        &self.exam
    }
}

fn valid_segment(segment: &str) -> bool {
    let trimmed = segment.trim();
    !trimmed.is_empty() && trimmed == segment && !segment.contains('/') && segment != ".."
}

/// Identity of one quiz session inside a serving layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a fresh random `SessionId`.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Debug for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BankId({}/{})", self.vendor, self.exam)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.vendor, self.exam)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for BankId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (vendor, exam) = s.split_once('/').ok_or_else(|| ParseIdError {
            kind: "BankId".to_string(),
        })?;
        let exam = exam.strip_suffix(".json").unwrap_or(exam);
        BankId::new(vendor, exam)
    }
}

impl FromStr for SessionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Uuid>().map(SessionId).map_err(|_| ParseIdError {
            kind: "SessionId".to_string(),
        })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
