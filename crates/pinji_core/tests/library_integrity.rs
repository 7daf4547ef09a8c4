use pinji_core::db::{open_db, open_db_in_memory};
use pinji_core::{
    KvStore, LibraryError, LibraryService, SqliteKvStore, StoreError, ValidationError, Word,
    WordStore, GROUPS_KEY, WORDS_KEY,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;

fn new_service() -> LibraryService<SqliteKvStore> {
    let kv = SqliteKvStore::new(open_db_in_memory().unwrap());
    LibraryService::new(WordStore::new(kv))
}

fn seeded_service(groups: &str, words: &str) -> LibraryService<SqliteKvStore> {
    let mut kv = SqliteKvStore::new(open_db_in_memory().unwrap());
    kv.set_items(&[(GROUPS_KEY, groups.to_string()), (WORDS_KEY, words.to_string())])
        .unwrap();
    LibraryService::new(WordStore::new(kv))
}

fn word(japanese: &str, english: &str, group: &str) -> Word {
    Word::with_timestamp(japanese, english, group, 1_700_000_000_000).unwrap()
}

#[test]
fn delete_group_cascades_to_its_words() {
    let service = seeded_service(
        r#"["Animals","Colors"]"#,
        r#"[
            {"japanese":"犬","english":"dog","group":"Animals","timestamp":1},
            {"japanese":"猫","english":"cat","group":"Colors","timestamp":2}
        ]"#,
    );

    let library = service.delete_group("Animals").unwrap();

    assert_eq!(library.groups, vec!["Colors"]);
    assert_eq!(library.words.len(), 1);
    assert_eq!(library.words[0].japanese, "猫");
    assert_eq!(library.words[0].english, "cat");
    assert_eq!(library.words[0].group, "Colors");

    assert_eq!(service.groups(), library.groups);
    assert_eq!(service.words(), library.words);
}

#[test]
fn random_group_operations_never_leave_orphaned_words() {
    let service = new_service();
    let names = ["Animals", "Colors", "Food", "Verbs"];
    let mut rng = StdRng::seed_from_u64(42);

    for step in 0..200 {
        let name = names[rng.random_range(0..names.len())];
        match rng.random_range(0..3) {
            0 => {
                service.add_group(name).unwrap();
            }
            1 => {
                if service.groups().iter().any(|group| group == name) {
                    service
                        .add_word(&format!("語{step}"), &format!("word {step}"), name)
                        .unwrap();
                }
            }
            _ => {
                service.delete_group(name).unwrap();
            }
        }

        let library = service.snapshot().unwrap();
        assert!(
            library.orphaned_words().is_empty(),
            "orphaned words after step {step}"
        );
    }
}

#[test]
fn add_group_rejects_blank_names_without_writing() {
    let service = new_service();
    service.add_group("Animals").unwrap();

    for blank in ["", "   ", "\t\n"] {
        let err = service.add_group(blank).unwrap_err();
        assert!(matches!(
            err,
            LibraryError::Validation(ValidationError::EmptyGroupName)
        ));
    }
    assert_eq!(service.groups(), vec!["Animals"]);
}

#[test]
fn add_group_stores_trimmed_name() {
    let service = new_service();
    let library = service.add_group("  Food  ").unwrap();
    assert_eq!(library.groups, vec!["Food"]);
}

#[test]
fn add_word_with_empty_field_is_rejected_and_words_unchanged() {
    let service = new_service();
    service.add_group("Animals").unwrap();
    service.add_word("犬", "dog", "Animals").unwrap();
    let before = service.words();

    let cases = [
        ("", "cat", "Animals", ValidationError::EmptyJapanese),
        ("猫", "", "Animals", ValidationError::EmptyEnglish),
        ("猫", "cat", "", ValidationError::EmptyGroup),
        ("  ", "cat", "Animals", ValidationError::EmptyJapanese),
    ];
    for (japanese, english, group, expected) in cases {
        let err = service.add_word(japanese, english, group).unwrap_err();
        match err {
            LibraryError::Validation(actual) => assert_eq!(actual, expected),
            other => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(service.words(), before);
}

#[test]
fn add_word_appends_with_timestamp() {
    let service = new_service();
    service.add_group("Animals").unwrap();
    service.add_word("犬", "dog", "Animals").unwrap();
    let library = service.add_word("猫", "cat", "Animals").unwrap();

    assert_eq!(library.words.len(), 2);
    assert_eq!(library.words[1].japanese, "猫");
    assert!(library.words[1].timestamp > 0);
    assert_eq!(service.words_in_group("Animals").len(), 2);
}

#[test]
fn delete_word_by_index_removes_exactly_one() {
    let service = seeded_service(
        r#"["Animals"]"#,
        r#"[
            {"japanese":"犬","english":"dog","group":"Animals","timestamp":1},
            {"japanese":"犬","english":"dog","group":"Animals","timestamp":1},
            {"japanese":"猫","english":"cat","group":"Animals","timestamp":2}
        ]"#,
    );

    let library = service.delete_word(0).unwrap();
    assert_eq!(library.words.len(), 2);
    assert_eq!(library.words[0].japanese, "犬");
    assert_eq!(library.words[1].japanese, "猫");

    let err = service.delete_word(9).unwrap_err();
    assert!(matches!(err, LibraryError::WordNotFound(_)));
    assert_eq!(service.words().len(), 2);
}

#[test]
fn delete_word_matching_removes_first_equal_word() {
    let service = new_service();
    service.add_group("Animals").unwrap();
    let dog = word("犬", "dog", "Animals");
    service.insert_word(dog.clone()).unwrap();
    service.insert_word(dog.clone()).unwrap();

    let library = service.delete_word_matching(&dog).unwrap();
    assert_eq!(library.words, vec![dog.clone()]);

    service.delete_word_matching(&dog).unwrap();
    let err = service.delete_word_matching(&dog).unwrap_err();
    assert!(matches!(err, LibraryError::WordNotFound(_)));
}

#[test]
fn stats_count_both_collections() {
    let service = new_service();
    assert_eq!(service.stats().group_count, 0);
    assert_eq!(service.stats().word_count, 0);

    service.add_group("Animals").unwrap();
    service.add_group("Colors").unwrap();
    service.add_word("犬", "dog", "Animals").unwrap();

    let stats = service.stats();
    assert_eq!(stats.group_count, 2);
    assert_eq!(stats.word_count, 1);
}

#[test]
fn failed_write_leaves_persisted_collections_unchanged() {
    let mut kv = SqliteKvStore::new(open_db_in_memory().unwrap());
    kv.set_items(&[
        (GROUPS_KEY, r#"["Animals"]"#.to_string()),
        (
            WORDS_KEY,
            r#"[{"japanese":"犬","english":"dog","group":"Animals","timestamp":1}]"#.to_string(),
        ),
    ])
    .unwrap();
    kv.connection()
        .execute_batch("PRAGMA query_only = ON;")
        .unwrap();
    let service = LibraryService::new(WordStore::new(kv));

    let err = service.delete_group("Animals").unwrap_err();
    match err {
        LibraryError::Store(store_err) => assert!(store_err.is_write()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.add_group("Colors").is_err());

    assert_eq!(service.groups(), vec!["Animals"]);
    assert_eq!(service.words().len(), 1);
}

#[test]
fn mutations_over_unreadable_words_fail_with_read_error() {
    // the last record predates the group field
    let raw_words = r#"[
        {"japanese":"犬","english":"dog","group":"Animals","timestamp":1},
        {"japanese":"猫","english":"cat","group":"Animals","timestamp":2},
        {"japanese":"鳥","english":"bird","timestamp":3}
    ]"#;
    let service = seeded_service(r#"["Animals"]"#, raw_words);
    assert!(service.words().is_empty());
    assert!(service.store().try_load_words().unwrap_err().is_read());

    let err = service.add_word("魚", "fish", "Animals").unwrap_err();
    match err {
        LibraryError::Store(store_err) => assert!(store_err.is_read()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.add_group("Colors").is_err());
    assert!(service.delete_group("Animals").is_err());

    assert_eq!(service.groups(), vec!["Animals"]);
    assert!(service.store().try_load_words().unwrap_err().is_read());
}

#[test]
fn mutations_leave_unreadable_raw_values_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pinji.db");
    let raw_groups = r#"["Animals"]"#;
    let raw_words = r#"[{"japanese":"犬","english":"dog","group":"Animals","timestamp":1},{"japanese":"鳥","english":"bird","timestamp":3}]"#;
    {
        let mut kv = SqliteKvStore::new(open_db(&path).unwrap());
        kv.set_items(&[
            (GROUPS_KEY, raw_groups.to_string()),
            (WORDS_KEY, raw_words.to_string()),
        ])
        .unwrap();
    }

    {
        let service = LibraryService::new(WordStore::new(SqliteKvStore::new(
            open_db(&path).unwrap(),
        )));
        assert!(service.add_word("犬", "dog", "Animals").is_err());
        assert!(service.add_group("Colors").is_err());
        assert!(matches!(
            service.store().try_load_words(),
            Err(StoreError::Read { key, .. }) if key == WORDS_KEY
        ));
    }

    let kv = SqliteKvStore::new(open_db(&path).unwrap());
    assert_eq!(kv.get_item(GROUPS_KEY).unwrap().as_deref(), Some(raw_groups));
    assert_eq!(kv.get_item(WORDS_KEY).unwrap().as_deref(), Some(raw_words));
}

#[test]
fn concurrent_writers_do_not_lose_updates() {
    let service = Arc::new(new_service());

    thread::scope(|scope| {
        for worker in 0..4 {
            let service = Arc::clone(&service);
            scope.spawn(move || {
                for i in 0..10 {
                    service.add_group(&format!("group-{worker}-{i}")).unwrap();
                }
            });
        }
    });

    assert_eq!(service.groups().len(), 40);
}
