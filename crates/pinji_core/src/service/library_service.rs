//! Group/word integrity rules.
//!
//! # Responsibility
//! - Validate user input before touching the store.
//! - Apply group and word mutations as single read-modify-write cycles.
//! - Serve the read projections used by the home and edit screens.
//!
//! # Invariants
//! - Deleting a group deletes its words in the same atomic write.
//! - Rejected input never reaches the store.
//! - Every successful mutation returns the snapshot that was persisted.

use crate::model::library::{Library, LibraryStats};
use crate::model::validation::{normalize_group_name, ValidationError};
use crate::model::word::{GroupName, Word};
use crate::store::kv::KvStore;
use crate::store::word_store::WordStore;
use crate::store::StoreError;
use log::{info, warn};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LibraryResult<T> = Result<T, LibraryError>;

/// How `add_group` treats a name that already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateGroupPolicy {
    /// Append anyway; duplicates are left for the user to clean up.
    #[default]
    Allow,
    /// Reject with `ValidationError::DuplicateGroup`.
    Reject,
}

/// Strictness knobs for the integrity rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryConfig {
    pub duplicate_groups: DuplicateGroupPolicy,
    /// Reject `add_word` for a group missing from the groups collection.
    pub require_existing_group: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            duplicate_groups: DuplicateGroupPolicy::Allow,
            require_existing_group: true,
        }
    }
}

/// Errors from library use-cases.
#[derive(Debug)]
pub enum LibraryError {
    /// Input rejected before any store access.
    Validation(ValidationError),
    /// Delete target is not in the words collection.
    WordNotFound(String),
    /// Store read/write failure.
    Store(StoreError),
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::WordNotFound(target) => write!(f, "word not found: {target}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LibraryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::WordNotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl LibraryError {
    /// Stable code for log lines and host-side branching.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.code(),
            Self::WordNotFound(_) => "word_not_found",
            Self::Store(err) => err.code(),
        }
    }
}

impl From<ValidationError> for LibraryError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for LibraryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Use-case facade over one shared `WordStore`.
pub struct LibraryService<S: KvStore> {
    store: WordStore<S>,
    config: LibraryConfig,
}

impl<S: KvStore> LibraryService<S> {
    /// Creates a service with default strictness.
    pub fn new(store: WordStore<S>) -> Self {
        Self::with_config(store, LibraryConfig::default())
    }

    pub fn with_config(store: WordStore<S>, config: LibraryConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> LibraryConfig {
        self.config
    }

    pub fn store(&self) -> &WordStore<S> {
        &self.store
    }

    /// Current groups; unreadable data reads as empty.
    pub fn groups(&self) -> Vec<GroupName> {
        self.store.load_groups()
    }

    /// Current words; unreadable data reads as empty.
    pub fn words(&self) -> Vec<Word> {
        self.store.load_words()
    }

    pub fn snapshot(&self) -> LibraryResult<Library> {
        Ok(self.store.snapshot()?)
    }

    /// Appends a new group.
    ///
    /// # Errors
    /// - `EmptyGroupName` for blank input.
    /// - `DuplicateGroup` when the name exists and the policy is `Reject`.
    pub fn add_group(&self, name: &str) -> LibraryResult<Library> {
        let name = normalize_group_name(name)?;
        let policy = self.config.duplicate_groups;

        let ((), library) = self
            .store
            .update(|library| {
                if policy == DuplicateGroupPolicy::Reject && library.has_group(&name) {
                    return Err(LibraryError::Validation(ValidationError::DuplicateGroup(
                        name.clone(),
                    )));
                }
                library.groups.push(name.clone());
                Ok::<_, LibraryError>(())
            })
            .inspect_err(|err| log_failure("group_add", err))?;

        info!(
            "event=group_add module=library status=ok name_len={} group_count={}",
            name.chars().count(),
            library.groups.len()
        );
        Ok(library)
    }

    /// Removes a group and every word tagged with it.
    ///
    /// Deleting a name that is not present is a no-op.
    pub fn delete_group(&self, name: &str) -> LibraryResult<Library> {
        let ((groups_removed, words_removed), library) = self
            .store
            .update(|library| Ok::<_, LibraryError>(library.remove_group(name)))
            .inspect_err(|err| log_failure("group_delete", err))?;

        info!(
            "event=group_delete module=library status=ok groups_removed={} words_removed={}",
            groups_removed, words_removed
        );
        Ok(library)
    }

    /// Appends a word stamped with the current time.
    ///
    /// # Errors
    /// - `EmptyJapanese` / `EmptyEnglish` / `EmptyGroup` for blank fields.
    /// - `UnknownGroup` when `require_existing_group` is on and the group is
    ///   not in the groups collection.
    pub fn add_word(&self, japanese: &str, english: &str, group: &str) -> LibraryResult<Library> {
        let word = Word::new(japanese, english, group)?;
        self.insert_word(word)
    }

    /// Appends an already-built word after validating it.
    pub fn insert_word(&self, word: Word) -> LibraryResult<Library> {
        word.validate()?;
        let require_group = self.config.require_existing_group;

        let ((), library) = self
            .store
            .update(|library| {
                if require_group && !library.has_group(&word.group) {
                    return Err(LibraryError::Validation(ValidationError::UnknownGroup(
                        word.group.clone(),
                    )));
                }
                library.words.push(word);
                Ok::<_, LibraryError>(())
            })
            .inspect_err(|err| log_failure("word_add", err))?;

        info!(
            "event=word_add module=library status=ok word_count={}",
            library.words.len()
        );
        Ok(library)
    }

    /// Removes the word at `index` in the stored list.
    pub fn delete_word(&self, index: usize) -> LibraryResult<Library> {
        let (_, library) = self
            .store
            .update(|library| {
                library
                    .remove_word_at(index)
                    .ok_or_else(|| LibraryError::WordNotFound(format!("index {index}")))
            })
            .inspect_err(|err| log_failure("word_delete", err))?;

        info!(
            "event=word_delete module=library status=ok word_count={}",
            library.words.len()
        );
        Ok(library)
    }

    /// Removes the first stored word equal to `target`.
    pub fn delete_word_matching(&self, target: &Word) -> LibraryResult<Library> {
        let (_, library) = self
            .store
            .update(|library| {
                library.remove_word_matching(target).ok_or_else(|| {
                    LibraryError::WordNotFound(format!("`{}` in `{}`", target.english, target.group))
                })
            })
            .inspect_err(|err| log_failure("word_delete", err))?;

        info!(
            "event=word_delete module=library status=ok word_count={}",
            library.words.len()
        );
        Ok(library)
    }

    /// Words of one group in stored order.
    pub fn words_in_group(&self, name: &str) -> Vec<Word> {
        self.words()
            .into_iter()
            .filter(|word| word.group == name)
            .collect()
    }

    pub fn stats(&self) -> LibraryStats {
        Library::new(self.groups(), self.words()).stats()
    }

    /// Picks one word uniformly at random, or `None` when there are none.
    pub fn random_word<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Word> {
        self.words().choose(rng).cloned()
    }
}

fn log_failure(event: &str, err: &LibraryError) {
    let line = failure_log_line(event, err);
    match err {
        LibraryError::Store(_) => warn!("{line}"),
        LibraryError::Validation(_) | LibraryError::WordNotFound(_) => info!("{line}"),
    }
}

/// Metadata-only failure line: codes, keys and lengths, never group or word text.
fn failure_log_line(event: &str, err: &LibraryError) -> String {
    let code = err.code();
    match err {
        LibraryError::Store(store_err) => format!(
            "event={event} module=library status=error error_code={code} key={}",
            store_err.key().unwrap_or("none")
        ),
        LibraryError::Validation(
            ValidationError::DuplicateGroup(name) | ValidationError::UnknownGroup(name),
        ) => format!(
            "event={event} module=library status=rejected error_code={code} name_len={}",
            name.chars().count()
        ),
        LibraryError::Validation(_) | LibraryError::WordNotFound(_) => {
            format!("event={event} module=library status=rejected error_code={code}")
        }
    }
}
