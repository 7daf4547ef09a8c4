//! Whole-collection store for groups and words.
//!
//! # Responsibility
//! - Load and save the `groups` and `flashcards` collections as JSON arrays.
//! - Validate persisted records at the decode boundary.
//! - Run read-modify-write cycles under one in-process lock.
//!
//! # Invariants
//! - `load_*` never fails; unreadable data is logged and read as empty.
//! - `update` refuses to run over unreadable data, so records it cannot
//!   decode are never overwritten.
//! - `update` writes only the collections the closure changed, in one
//!   atomic backend write.
//! - A failed write leaves persisted state exactly as it was.

use super::kv::KvStore;
use super::{StoreError, StoreResult};
use crate::model::library::Library;
use crate::model::word::{GroupName, Word};
use log::{debug, error, warn};
use std::sync::{Mutex, MutexGuard};

/// Storage key for the group name array.
pub const GROUPS_KEY: &str = "groups";
/// Storage key for the word record array.
pub const WORDS_KEY: &str = "flashcards";

/// Owner of both persisted collections.
///
/// Share one instance (for example behind `Arc`) between every screen that
/// mutates vocabulary so their read-modify-write cycles serialize.
pub struct WordStore<S: KvStore> {
    backend: Mutex<S>,
}

impl<S: KvStore> WordStore<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend: Mutex::new(backend),
        }
    }

    /// Loads persisted group names, or an empty list when unavailable.
    pub fn load_groups(&self) -> Vec<GroupName> {
        recover_empty(GROUPS_KEY, self.try_load_groups())
    }

    /// Loads persisted words, or an empty list when unavailable.
    pub fn load_words(&self) -> Vec<Word> {
        recover_empty(WORDS_KEY, self.try_load_words())
    }

    /// Loads group names, reporting unreadable data instead of hiding it.
    pub fn try_load_groups(&self) -> StoreResult<Vec<GroupName>> {
        let backend = self.lock()?;
        read_groups(&*backend)
    }

    /// Loads words, reporting unreadable data instead of hiding it.
    pub fn try_load_words(&self) -> StoreResult<Vec<Word>> {
        let backend = self.lock()?;
        read_words(&*backend)
    }

    /// Loads both collections with the same recovery rules as `load_*`.
    pub fn snapshot(&self) -> StoreResult<Library> {
        let backend = self.lock()?;
        Ok(read_library(&*backend))
    }

    /// Overwrites the persisted group collection.
    pub fn save_groups(&self, groups: &[GroupName]) -> StoreResult<()> {
        let mut backend = self.lock()?;
        write_entries(&mut *backend, vec![encode_groups(groups)?])
    }

    /// Overwrites the persisted word collection.
    pub fn save_words(&self, words: &[Word]) -> StoreResult<()> {
        let mut backend = self.lock()?;
        write_entries(&mut *backend, vec![encode_words(words)?])
    }

    /// Overwrites both collections in one atomic write.
    pub fn save_library(&self, library: &Library) -> StoreResult<()> {
        let mut backend = self.lock()?;
        write_entries(
            &mut *backend,
            vec![encode_groups(&library.groups)?, encode_words(&library.words)?],
        )
    }

    /// Runs one serialized read-modify-write cycle.
    ///
    /// `mutate` sees the current persisted snapshot. When it returns `Ok`,
    /// every collection it changed is written back atomically and the new
    /// snapshot is returned alongside its value. When it returns `Err`,
    /// nothing is written.
    ///
    /// # Errors
    /// - Errors from `mutate` are returned unchanged.
    /// - Either collection failing to read aborts before `mutate` runs, as
    ///   `StoreError::Read` converted into `E`. Nothing is written.
    /// - Encode/write failures surface as `StoreError` converted into `E`.
    pub fn update<T, E>(
        &self,
        mutate: impl FnOnce(&mut Library) -> Result<T, E>,
    ) -> Result<(T, Library), E>
    where
        E: From<StoreError>,
    {
        let mut backend = self.lock()?;
        let before = Library::new(read_groups(&*backend)?, read_words(&*backend)?);
        let mut after = before.clone();
        let value = mutate(&mut after)?;

        let mut entries = Vec::with_capacity(2);
        if after.groups != before.groups {
            entries.push(encode_groups(&after.groups)?);
        }
        if after.words != before.words {
            entries.push(encode_words(&after.words)?);
        }
        if entries.is_empty() {
            debug!("event=store_update module=store status=noop");
            return Ok((value, after));
        }

        write_entries(&mut *backend, entries)?;
        Ok((value, after))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, S>> {
        self.backend.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

fn read_library<S: KvStore>(backend: &S) -> Library {
    Library::new(
        recover_empty(GROUPS_KEY, read_groups(backend)),
        recover_empty(WORDS_KEY, read_words(backend)),
    )
}

fn read_groups<S: KvStore>(backend: &S) -> StoreResult<Vec<GroupName>> {
    let Some(raw) = read_raw(backend, GROUPS_KEY)? else {
        return Ok(Vec::new());
    };
    let groups: Vec<GroupName> = decode(GROUPS_KEY, &raw)?;
    if let Some(position) = groups.iter().position(|name| name.trim().is_empty()) {
        return Err(StoreError::Read {
            key: GROUPS_KEY,
            reason: format!("blank group name at index {position}"),
        });
    }
    Ok(groups)
}

fn read_words<S: KvStore>(backend: &S) -> StoreResult<Vec<Word>> {
    let Some(raw) = read_raw(backend, WORDS_KEY)? else {
        return Ok(Vec::new());
    };
    let words: Vec<Word> = decode(WORDS_KEY, &raw)?;
    for (index, word) in words.iter().enumerate() {
        word.validate().map_err(|err| StoreError::Read {
            key: WORDS_KEY,
            reason: format!("invalid word at index {index}: {err}"),
        })?;
    }
    Ok(words)
}

fn read_raw<S: KvStore>(backend: &S, key: &'static str) -> StoreResult<Option<String>> {
    backend.get_item(key).map_err(|err| StoreError::Read {
        key,
        reason: err.to_string(),
    })
}

fn decode<T: serde::de::DeserializeOwned>(key: &'static str, raw: &str) -> StoreResult<T> {
    serde_json::from_str(raw).map_err(|err| StoreError::Read {
        key,
        reason: err.to_string(),
    })
}

fn encode_groups(groups: &[GroupName]) -> StoreResult<(&'static str, String)> {
    encode(GROUPS_KEY, groups)
}

fn encode_words(words: &[Word]) -> StoreResult<(&'static str, String)> {
    encode(WORDS_KEY, words)
}

fn encode<T: serde::Serialize + ?Sized>(
    key: &'static str,
    value: &T,
) -> StoreResult<(&'static str, String)> {
    serde_json::to_string(value)
        .map(|json| (key, json))
        .map_err(|err| StoreError::Encode {
            key,
            reason: err.to_string(),
        })
}

fn write_entries<S: KvStore>(
    backend: &mut S,
    entries: Vec<(&'static str, String)>,
) -> StoreResult<()> {
    let key = entries.first().map_or(GROUPS_KEY, |(key, _)| *key);
    match backend.set_items(&entries) {
        Ok(()) => {
            debug!(
                "event=store_write module=store status=ok key_count={}",
                entries.len()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=store_write module=store status=error key={} key_count={} error={}",
                key,
                entries.len(),
                err
            );
            Err(StoreError::Write { key, source: err })
        }
    }
}

fn recover_empty<T>(key: &'static str, result: StoreResult<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            warn!(
                "event=store_read module=store status=recovered key={} error_code={}",
                key,
                err.code()
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{WordStore, GROUPS_KEY, WORDS_KEY};
    use crate::db::open_db_in_memory;
    use crate::model::word::Word;
    use crate::store::kv::{KvStore, SqliteKvStore};
    use crate::store::StoreError;

    fn store_with(raw: &[(&str, &str)]) -> WordStore<SqliteKvStore> {
        let mut kv = SqliteKvStore::new(open_db_in_memory().unwrap());
        let items = raw
            .iter()
            .map(|(key, value)| (*key, value.to_string()))
            .collect::<Vec<_>>();
        kv.set_items(&items).unwrap();
        WordStore::new(kv)
    }

    #[test]
    fn empty_store_loads_empty_collections() {
        let store = store_with(&[]);
        assert!(store.load_groups().is_empty());
        assert!(store.load_words().is_empty());
    }

    #[test]
    fn corrupt_groups_recover_as_empty_but_try_load_reports() {
        let store = store_with(&[(GROUPS_KEY, "{not json")]);
        assert!(store.load_groups().is_empty());
        let err = store.try_load_groups().unwrap_err();
        assert!(err.is_read());
    }

    #[test]
    fn word_with_missing_field_is_a_read_error() {
        let store = store_with(&[(
            WORDS_KEY,
            r#"[{"japanese":"犬","english":"dog","timestamp":1}]"#,
        )]);
        assert!(matches!(
            store.try_load_words(),
            Err(StoreError::Read { key, .. }) if key == WORDS_KEY
        ));
        assert!(store.load_words().is_empty());
    }

    #[test]
    fn word_with_blank_text_is_a_read_error() {
        let store = store_with(&[(
            WORDS_KEY,
            r#"[{"japanese":"","english":"dog","group":"Animals","timestamp":1}]"#,
        )]);
        assert!(store.try_load_words().unwrap_err().is_read());
    }

    #[test]
    fn blank_group_entry_is_a_read_error() {
        let store = store_with(&[(GROUPS_KEY, r#"["Animals", "  "]"#)]);
        assert!(store.try_load_groups().unwrap_err().is_read());
    }

    #[test]
    fn saved_collections_load_back_in_order() {
        let store = store_with(&[]);
        let words = vec![
            Word::with_timestamp("犬", "dog", "Animals", 1).unwrap(),
            Word::with_timestamp("猫", "cat", "Animals", 2).unwrap(),
        ];
        store
            .save_groups(&["Animals".to_string(), "Colors".to_string()])
            .unwrap();
        store.save_words(&words).unwrap();

        assert_eq!(store.load_groups(), vec!["Animals", "Colors"]);
        assert_eq!(store.load_words(), words);
    }

    #[test]
    fn update_writes_only_changed_collections() {
        let raw_words = r#"[ {"japanese":"犬","english":"dog","group":"Animals","timestamp":1} ]"#;
        let store = store_with(&[(WORDS_KEY, raw_words)]);
        let ((), library) = store
            .update::<_, StoreError>(|library| {
                library.groups.push("Animals".to_string());
                Ok(())
            })
            .unwrap();
        assert_eq!(library.groups, vec!["Animals"]);
        assert_eq!(library.words.len(), 1);

        // the untouched word key keeps its original bytes
        let backend = store.backend.lock().unwrap();
        assert_eq!(backend.get_item(WORDS_KEY).unwrap().as_deref(), Some(raw_words));
    }

    #[test]
    fn update_over_unreadable_collection_fails_without_writing() {
        let raw_words = r#"[{"japanese":"犬","english":"dog","group":"Animals","timestamp":1},{"japanese":"鳥","english":"bird","timestamp":2}]"#;
        let store = store_with(&[(GROUPS_KEY, r#"["Animals"]"#), (WORDS_KEY, raw_words)]);
        let mut ran = false;

        let err = store
            .update::<(), StoreError>(|library| {
                ran = true;
                library.groups.push("Colors".to_string());
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::Read { key, .. } if key == WORDS_KEY));
        assert!(!ran);
        let backend = store.backend.lock().unwrap();
        assert_eq!(
            backend.get_item(GROUPS_KEY).unwrap().as_deref(),
            Some(r#"["Animals"]"#)
        );
        assert_eq!(backend.get_item(WORDS_KEY).unwrap().as_deref(), Some(raw_words));
    }

    #[test]
    fn update_closure_error_writes_nothing() {
        let store = store_with(&[(GROUPS_KEY, r#"["Animals"]"#)]);
        let result = store.update::<(), StoreError>(|library| {
            library.groups.clear();
            Err(StoreError::LockPoisoned)
        });
        assert!(result.is_err());
        assert_eq!(store.load_groups(), vec!["Animals"]);
    }
}
