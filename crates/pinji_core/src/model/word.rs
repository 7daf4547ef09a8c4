//! Word record model.
//!
//! # Responsibility
//! - Define the Japanese/English pair persisted under the `flashcards` key.
//! - Validate required text fields at construction and at load time.
//!
//! # Invariants
//! - `japanese`, `english` and `group` are non-blank.
//! - `timestamp` records creation time and never drives ordering.

use super::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Name of a vocabulary group. Case-sensitive, compared verbatim.
pub type GroupName = String;

/// One flashcard as stored in the `flashcards` JSON array.
///
/// Field names match the persisted schema; unknown fields are rejected so
/// malformed records surface as read errors instead of half-filled words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Word {
    pub japanese: String,
    pub english: String,
    /// Owning group name.
    pub group: GroupName,
    /// Unix epoch milliseconds at creation.
    pub timestamp: i64,
}

impl Word {
    /// Creates a validated word stamped with the current time.
    ///
    /// Text fields are trimmed before validation.
    pub fn new(
        japanese: impl AsRef<str>,
        english: impl AsRef<str>,
        group: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        Self::with_timestamp(japanese, english, group, now_epoch_ms())
    }

    /// Creates a validated word with a caller-provided creation time.
    pub fn with_timestamp(
        japanese: impl AsRef<str>,
        english: impl AsRef<str>,
        group: impl AsRef<str>,
        timestamp: i64,
    ) -> Result<Self, ValidationError> {
        let word = Self {
            japanese: japanese.as_ref().trim().to_string(),
            english: english.as_ref().trim().to_string(),
            group: group.as_ref().trim().to_string(),
            timestamp,
        };
        word.validate()?;
        Ok(word)
    }

    /// Checks that every required text field is present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.japanese.trim().is_empty() {
            return Err(ValidationError::EmptyJapanese);
        }
        if self.english.trim().is_empty() {
            return Err(ValidationError::EmptyEnglish);
        }
        if self.group.trim().is_empty() {
            return Err(ValidationError::EmptyGroup);
        }
        Ok(())
    }

    /// Whether the two words carry the same answer text.
    pub fn same_answer(&self, other: &Word) -> bool {
        self.japanese == other.japanese
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
