use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Highest number of choices a question can carry (`A` through `Z`).
pub const MAX_CHOICES: usize = 26;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LetterError {
    #[error("choice letter must be A-Z, got {0:?}")]
    Invalid(char),

    #[error("choice letter cannot be empty")]
    Empty,

    #[error("choice position {0} has no letter (only A-Z are available)")]
    PositionTooLarge(usize),
}

/// Letter label of a choice, derived from its position (`0 => A`).
///
/// Letters are never stored alongside choice text; they are recomputed from
/// the position every time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct ChoiceLetter(u8);

impl ChoiceLetter {
    /// Letter for the choice at `position`.
    ///
    /// # Errors
    ///
    /// Returns `LetterError::PositionTooLarge` past `Z`.
    pub fn from_position(position: usize) -> Result<Self, LetterError> {
        u8::try_from(position)
            .ok()
            .filter(|p| usize::from(*p) < MAX_CHOICES)
            .map(Self)
            .ok_or(LetterError::PositionTooLarge(position))
    }

    /// Parses a single letter, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `LetterError::Invalid` for anything outside `A-Z`.
    pub fn from_char(c: char) -> Result<Self, LetterError> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Ok(Self(upper as u8 - b'A'))
        } else {
            Err(LetterError::Invalid(c))
        }
    }

    /// Parses a compact letter list such as `"AC"`; separators (`,`, spaces) are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first invalid character.
    pub fn parse_many(raw: &str) -> Result<Vec<Self>, LetterError> {
        raw.chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(Self::from_char)
            .collect()
    }

    /// Zero-based position of the choice this letter addresses.
    #[must_use]
    pub fn position(self) -> usize {
        usize::from(self.0)
    }

    #[must_use]
    pub fn as_char(self) -> char {
        char::from(b'A' + self.0)
    }
}

impl fmt::Debug for ChoiceLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChoiceLetter({})", self.as_char())
    }
}

impl fmt::Display for ChoiceLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for ChoiceLetter {
    type Error = LetterError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Self::from_char(value)
    }
}

impl From<ChoiceLetter> for char {
    fn from(value: ChoiceLetter) -> Self {
        value.as_char()
    }
}

impl FromStr for ChoiceLetter {
    type Err = LetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let first = chars.next().ok_or(LetterError::Empty)?;
        match chars.next() {
            None => Self::from_char(first),
            Some(extra) => Err(LetterError::Invalid(extra)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_map_to_letters() {
        assert_eq!(ChoiceLetter::from_position(0).unwrap().as_char(), 'A');
        assert_eq!(ChoiceLetter::from_position(25).unwrap().as_char(), 'Z');
        assert_eq!(
            ChoiceLetter::from_position(26),
            Err(LetterError::PositionTooLarge(26))
        );
    }

    #[test]
    fn parses_case_insensitively() {
        let letter: ChoiceLetter = "c".parse().unwrap();
        assert_eq!(letter.position(), 2);
        assert!("AB".parse::<ChoiceLetter>().is_err());
        assert!("".parse::<ChoiceLetter>().is_err());
        assert!("1".parse::<ChoiceLetter>().is_err());
    }

    #[test]
    fn parse_many_skips_separators() {
        let letters = ChoiceLetter::parse_many("A, c").unwrap();
        assert_eq!(letters.iter().map(|l| l.as_char()).collect::<String>(), "AC");
        assert_eq!(
            ChoiceLetter::parse_many("A?"),
            Err(LetterError::Invalid('?'))
        );
    }
}
