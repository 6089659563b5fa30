use std::collections::BTreeSet;

use crate::model::ChoiceLetter;

/// Letters the user currently has toggled on for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet(BTreeSet<ChoiceLetter>);

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `letter`. Returns true if it is now selected.
    pub fn toggle(&mut self, letter: ChoiceLetter) -> bool {
        if self.0.remove(&letter) {
            false
        } else {
            self.0.insert(letter);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, letter: ChoiceLetter) -> bool {
        self.0.contains(&letter)
    }

    #[must_use]
    pub fn letters(&self) -> &BTreeSet<ChoiceLetter> {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<ChoiceLetter> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = ChoiceLetter>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_toggle_is_noop() {
        let a = ChoiceLetter::from_char('A').unwrap();
        let b = ChoiceLetter::from_char('B').unwrap();
        let mut set: SelectionSet = [b].into_iter().collect();
        let before = set.clone();

        assert!(set.toggle(a));
        assert!(set.contains(a));
        assert!(!set.toggle(a));
        assert_eq!(set, before);
    }
}
