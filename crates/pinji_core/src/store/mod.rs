//! Persistence for the two vocabulary collections.
//!
//! # Responsibility
//! - Abstract the device key-value store behind `KvStore`.
//! - Encode/decode the `groups` and `flashcards` JSON arrays.
//! - Serialize read-modify-write cycles so concurrent callers cannot lose
//!   updates.
//!
//! # Invariants
//! - Collections are always read and written whole.
//! - A multi-key write either lands completely or not at all.

pub mod kv;
pub mod word_store;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures at the word store boundary.
#[derive(Debug)]
pub enum StoreError {
    /// Stored value could not be read or does not match the schema.
    Read { key: &'static str, reason: String },
    /// Collection could not be written; nothing was persisted.
    Write { key: &'static str, source: DbError },
    /// Collection could not be encoded for writing.
    Encode { key: &'static str, reason: String },
    /// A previous writer panicked while holding the store lock.
    LockPoisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { key, reason } => write!(f, "failed to read `{key}`: {reason}"),
            Self::Write { key, source } => write!(f, "failed to save `{key}`: {source}"),
            Self::Encode { key, reason } => write!(f, "failed to encode `{key}`: {reason}"),
            Self::LockPoisoned => write!(f, "word store lock poisoned by an earlier panic"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl StoreError {
    /// Whether this error came from the read path.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    /// Whether this error came from the write path.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. } | Self::Encode { .. })
    }

    /// Storage key involved, if any.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::Read { key, .. } | Self::Write { key, .. } | Self::Encode { key, .. } => {
                Some(*key)
            }
            Self::LockPoisoned => None,
        }
    }

    /// Stable code for log lines; never carries stored content.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "store_read_failed",
            Self::Write { .. } => "store_write_failed",
            Self::Encode { .. } => "store_encode_failed",
            Self::LockPoisoned => "store_lock_poisoned",
        }
    }
}
