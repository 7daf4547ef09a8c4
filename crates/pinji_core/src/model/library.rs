//! In-memory snapshot of both persisted collections.
//!
//! # Responsibility
//! - Carry `groups` and `words` together so cascade edits stay in one value.
//! - Provide the pure read/modify helpers used inside store transactions.
//!
//! # Invariants
//! - `remove_group` drops the group and all of its words in one step.
//! - Helpers never reorder the remaining entries.

use super::word::{GroupName, Word};
use serde::Serialize;

/// Groups and words as loaded from (or about to be written to) the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    pub groups: Vec<GroupName>,
    pub words: Vec<Word>,
}

/// Collection sizes shown on the home screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LibraryStats {
    pub group_count: usize,
    pub word_count: usize,
}

impl Library {
    pub fn new(groups: Vec<GroupName>, words: Vec<Word>) -> Self {
        Self { groups, words }
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.groups.iter().any(|group| group == name)
    }

    /// Words tagged with `name`, in stored order.
    pub fn words_in_group(&self, name: &str) -> Vec<Word> {
        self.words
            .iter()
            .filter(|word| word.group == name)
            .cloned()
            .collect()
    }

    /// Removes every occurrence of `name` and every word tagged with it.
    ///
    /// Returns `(groups_removed, words_removed)`.
    pub fn remove_group(&mut self, name: &str) -> (usize, usize) {
        let groups_before = self.groups.len();
        let words_before = self.words.len();
        self.groups.retain(|group| group != name);
        self.words.retain(|word| word.group != name);
        (
            groups_before - self.groups.len(),
            words_before - self.words.len(),
        )
    }

    /// Removes the word at `index`, if present.
    pub fn remove_word_at(&mut self, index: usize) -> Option<Word> {
        if index < self.words.len() {
            Some(self.words.remove(index))
        } else {
            None
        }
    }

    /// Removes the first word equal to `target`, if present.
    pub fn remove_word_matching(&mut self, target: &Word) -> Option<Word> {
        let index = self.words.iter().position(|word| word == target)?;
        Some(self.words.remove(index))
    }

    /// Words whose group is missing from `groups`.
    pub fn orphaned_words(&self) -> Vec<&Word> {
        self.words
            .iter()
            .filter(|word| !self.has_group(&word.group))
            .collect()
    }

    pub fn stats(&self) -> LibraryStats {
        LibraryStats {
            group_count: self.groups.len(),
            word_count: self.words.len(),
        }
    }
}
