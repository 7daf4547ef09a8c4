//! Input validation shared by the store, library service and practice session.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected before any store access happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Group name is empty after trim.
    EmptyGroupName,
    /// Word has no Japanese text.
    EmptyJapanese,
    /// Word has no English text.
    EmptyEnglish,
    /// Word is not tagged with a group.
    EmptyGroup,
    /// Group already exists and duplicates are rejected.
    DuplicateGroup(String),
    /// Group is not present in the groups collection.
    UnknownGroup(String),
    /// Practice count is not a positive integer.
    InvalidCount(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGroupName => write!(f, "group name must not be blank"),
            Self::EmptyJapanese => write!(f, "japanese text must not be blank"),
            Self::EmptyEnglish => write!(f, "english text must not be blank"),
            Self::EmptyGroup => write!(f, "word must belong to a group"),
            Self::DuplicateGroup(name) => write!(f, "group already exists: `{name}`"),
            Self::UnknownGroup(name) => write!(f, "group not found: `{name}`"),
            Self::InvalidCount(raw) => {
                write!(f, "word count must be a positive integer, got `{raw}`")
            }
        }
    }
}

impl Error for ValidationError {}

impl ValidationError {
    /// Stable code for log lines; never carries user text.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyGroupName => "empty_group_name",
            Self::EmptyJapanese => "empty_japanese",
            Self::EmptyEnglish => "empty_english",
            Self::EmptyGroup => "empty_group",
            Self::DuplicateGroup(_) => "duplicate_group",
            Self::UnknownGroup(_) => "unknown_group",
            Self::InvalidCount(_) => "invalid_count",
        }
    }
}

/// Trims a group name and rejects blank input.
pub fn normalize_group_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyGroupName);
    }
    Ok(trimmed.to_string())
}

/// Parses the practice word count typed by the user.
///
/// Accepts surrounding whitespace; rejects zero, negatives and anything that
/// is not a plain decimal integer.
pub fn parse_word_count(raw: &str) -> Result<usize, ValidationError> {
    match raw.trim().parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ValidationError::InvalidCount(raw.to_string())),
    }
}
