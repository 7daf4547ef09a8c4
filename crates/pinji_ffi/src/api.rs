//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose vocabulary use-cases to Dart via FRB.
//! - Translate core errors into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - All calls share one process-wide `LibraryService`, so screens calling in
//!   parallel serialize on the same store lock.
//! - One practice session and one review session exist per process; starting
//!   a new one replaces the previous.

use log::error;
use once_cell::sync::OnceCell;
use pinji_core::db::open_db;
use pinji_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AnswerFeedback, Library, LibraryService, PracticePhase, PracticeResult, PracticeSession,
    Question, ReviewSession, SqliteKvStore, Word, WordStore,
};
use std::path::PathBuf;
use std::sync::Mutex;

const LIBRARY_DB_FILE_NAME: &str = "pinji_library.sqlite3";
static LIBRARY_DB_PATH: OnceCell<PathBuf> = OnceCell::new();
static LIBRARY_SERVICE: OnceCell<LibraryService<SqliteKvStore>> = OnceCell::new();
static PRACTICE_SESSION: Mutex<Option<PracticeSession>> = Mutex::new(None);
static REVIEW_SESSION: Mutex<Option<ReviewSession>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One flashcard as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordItem {
    pub japanese: String,
    pub english: String,
    pub group: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
}

/// Full collections after a read or a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Human-readable message for alerts and diagnostics.
    pub message: String,
    /// Group names in stored order; empty on failure.
    pub groups: Vec<String>,
    /// Words in stored order; indexes match `word_delete`.
    pub words: Vec<WordItem>,
}

impl LibraryResponse {
    fn success(message: impl Into<String>, library: Library) -> Self {
        Self {
            ok: true,
            message: message.into(),
            groups: library.groups,
            words: library.words.into_iter().map(to_word_item).collect(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            groups: Vec::new(),
            words: Vec::new(),
        }
    }
}

/// Home screen counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryStatsItem {
    pub group_count: u32,
    pub word_count: u32,
}

/// Loads both collections.
#[flutter_rust_bridge::frb(sync)]
pub fn library_load() -> LibraryResponse {
    match with_library_service(|service| service.snapshot().map_err(|err| err.to_string())) {
        Ok(library) => LibraryResponse::success("Library loaded.", library),
        Err(err) => LibraryResponse::failure(format!("library_load failed: {err}")),
    }
}

/// Group names in stored order; empty when the store is unavailable.
#[flutter_rust_bridge::frb(sync)]
pub fn groups_list() -> Vec<String> {
    with_library_service(|service| Ok(service.groups())).unwrap_or_default()
}

/// Every word in stored order; empty when the store is unavailable.
#[flutter_rust_bridge::frb(sync)]
pub fn words_list() -> Vec<WordItem> {
    with_library_service(|service| Ok(service.words()))
        .unwrap_or_default()
        .into_iter()
        .map(to_word_item)
        .collect()
}

/// Words of one group in stored order.
#[flutter_rust_bridge::frb(sync)]
pub fn words_in_group(group: String) -> Vec<WordItem> {
    with_library_service(|service| Ok(service.words_in_group(&group)))
        .unwrap_or_default()
        .into_iter()
        .map(to_word_item)
        .collect()
}

/// Creates a group.
#[flutter_rust_bridge::frb(sync)]
pub fn group_add(name: String) -> LibraryResponse {
    match with_library_service(|service| service.add_group(&name).map_err(|err| err.to_string()))
    {
        Ok(library) => LibraryResponse::success("Group created.", library),
        Err(err) => LibraryResponse::failure(format!("group_add failed: {err}")),
    }
}

/// Deletes a group together with its words.
#[flutter_rust_bridge::frb(sync)]
pub fn group_delete(name: String) -> LibraryResponse {
    match with_library_service(|service| {
        service.delete_group(&name).map_err(|err| err.to_string())
    }) {
        Ok(library) => LibraryResponse::success("Group deleted.", library),
        Err(err) => LibraryResponse::failure(format!("group_delete failed: {err}")),
    }
}

/// Adds a word to an existing group.
#[flutter_rust_bridge::frb(sync)]
pub fn word_add(japanese: String, english: String, group: String) -> LibraryResponse {
    match with_library_service(|service| {
        service
            .add_word(&japanese, &english, &group)
            .map_err(|err| err.to_string())
    }) {
        Ok(library) => LibraryResponse::success("Word saved.", library),
        Err(err) => LibraryResponse::failure(format!("word_add failed: {err}")),
    }
}

/// Deletes the word at `index` of `words_list`.
#[flutter_rust_bridge::frb(sync)]
pub fn word_delete(index: u32) -> LibraryResponse {
    match with_library_service(|service| {
        service
            .delete_word(index as usize)
            .map_err(|err| err.to_string())
    }) {
        Ok(library) => LibraryResponse::success("Word deleted.", library),
        Err(err) => LibraryResponse::failure(format!("word_delete failed: {err}")),
    }
}

/// Collection counts; zeros when the store is unavailable.
#[flutter_rust_bridge::frb(sync)]
pub fn library_stats() -> LibraryStatsItem {
    let stats = with_library_service(|service| Ok(service.stats())).unwrap_or_default();
    LibraryStatsItem {
        group_count: saturating_u32(stats.group_count),
        word_count: saturating_u32(stats.word_count),
    }
}

/// One uniformly chosen word for the home card, or `None`.
#[flutter_rust_bridge::frb(sync)]
pub fn random_word() -> Option<WordItem> {
    with_library_service(|service| Ok(service.random_word(&mut rand::rng())))
        .ok()
        .flatten()
        .map(to_word_item)
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionItem {
    pub index: u32,
    pub total: u32,
    /// English prompt.
    pub prompt: String,
    /// Empty until `practice_question` is called for this index.
    pub options: Vec<WordItem>,
}

/// Answer being revealed after `practice_submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackItem {
    pub correct: bool,
    pub answer: WordItem,
    pub is_last: bool,
    /// How long to show the answer before calling `practice_advance`.
    pub reveal_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeResultItem {
    pub total: u32,
    pub correct: u32,
    pub incorrect_words: Vec<WordItem>,
}

/// Practice screen state after a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeResponse {
    pub ok: bool,
    pub message: String,
    /// One of `selecting_group|configuring_count|in_progress|complete`.
    pub phase: String,
    pub selected_group: Option<String>,
    pub question: Option<QuestionItem>,
    pub feedback: Option<FeedbackItem>,
    pub result: Option<PracticeResultItem>,
}

impl PracticeResponse {
    fn from_session(ok: bool, message: String, session: Option<&PracticeSession>) -> Self {
        let Some(session) = session else {
            return Self {
                ok,
                message,
                phase: PracticePhase::SelectingGroup.as_str().to_string(),
                selected_group: None,
                question: None,
                feedback: None,
                result: None,
            };
        };
        let reveal_ms = saturating_u32_millis(session.reveal_duration().as_millis());
        Self {
            ok,
            message,
            phase: session.phase().as_str().to_string(),
            selected_group: session.selected_group().map(str::to_string),
            question: session.current_question().map(to_question_item),
            feedback: session
                .revealed()
                .map(|feedback| to_feedback_item(feedback, reveal_ms)),
            result: session.result().map(to_result_item),
        }
    }
}

/// Starts a new practice run on `group`, replacing any previous run.
#[flutter_rust_bridge::frb(sync)]
pub fn practice_select_group(group: String) -> PracticeResponse {
    with_practice_session(|slot| {
        let groups = with_library_service(|service| Ok(service.groups()))
            .map_err(|err| format!("practice_select_group failed: {err}"))?;
        let mut session = PracticeSession::new(groups);
        let selected = session.select_group(&group);
        *slot = Some(session);
        selected
            .map(|()| "Group selected.")
            .map_err(|err| format!("practice_select_group failed: {err}"))
    })
}

/// Samples `count` words from the selected group and starts the quiz.
#[flutter_rust_bridge::frb(sync)]
pub fn practice_start(count: String) -> PracticeResponse {
    with_practice_session(|slot| {
        let session = active_practice(slot, "practice_start")?;
        let words = with_library_service(|service| Ok(service.words()))
            .map_err(|err| format!("practice_start failed: {err}"))?;
        session
            .start_practice(&count, &words, &mut rand::rng())
            .map_err(|err| format!("practice_start failed: {err}"))?;
        Ok("Practice started.")
    })
}

/// Presents the current question with shuffled options.
#[flutter_rust_bridge::frb(sync)]
pub fn practice_question() -> PracticeResponse {
    with_practice_session(|slot| {
        active_practice(slot, "practice_question")?
            .present_question(&mut rand::rng())
            .map_err(|err| format!("practice_question failed: {err}"))?;
        Ok("Question ready.")
    })
}

/// Submits the option whose Japanese text is `japanese`.
#[flutter_rust_bridge::frb(sync)]
pub fn practice_submit(japanese: String) -> PracticeResponse {
    with_practice_session(|slot| {
        let session = active_practice(slot, "practice_submit")?;
        let chosen = session
            .current_question()
            .and_then(|question| {
                question
                    .options
                    .into_iter()
                    .find(|option| option.japanese == japanese)
            })
            .ok_or_else(|| "practice_submit failed: answer is not one of the options".to_string())?;
        let feedback = session
            .submit_answer(&chosen)
            .map_err(|err| format!("practice_submit failed: {err}"))?;
        Ok(if feedback.correct { "Correct." } else { "Incorrect." })
    })
}

/// Leaves the revealed answer and moves to the next question or the result.
#[flutter_rust_bridge::frb(sync)]
pub fn practice_advance() -> PracticeResponse {
    with_practice_session(|slot| {
        active_practice(slot, "practice_advance")?
            .advance()
            .map_err(|err| format!("practice_advance failed: {err}"))?;
        Ok("Advanced.")
    })
}

/// Current practice state without changing it.
#[flutter_rust_bridge::frb(sync)]
pub fn practice_state() -> PracticeResponse {
    with_practice_session(|_| Ok("Practice state loaded."))
}

/// Drops the practice run and returns to group selection.
#[flutter_rust_bridge::frb(sync)]
pub fn practice_reset() -> PracticeResponse {
    with_practice_session(|slot| {
        if let Some(session) = slot.as_mut() {
            session.reset();
        }
        *slot = None;
        Ok("Practice reset.")
    })
}

/// Review card state after a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewResponse {
    pub ok: bool,
    pub message: String,
    pub index: u32,
    pub total: u32,
    pub revealed: bool,
    /// Text on the visible face; `None` when there are no cards.
    pub visible_text: Option<String>,
    pub card: Option<WordItem>,
}

impl ReviewResponse {
    fn from_session(ok: bool, message: String, session: Option<&ReviewSession>) -> Self {
        let Some(session) = session else {
            return Self {
                ok,
                message,
                index: 0,
                total: 0,
                revealed: false,
                visible_text: None,
                card: None,
            };
        };
        Self {
            ok,
            message,
            index: saturating_u32(session.current_index()),
            total: saturating_u32(session.len()),
            revealed: session.is_revealed(),
            visible_text: session.visible_text().map(str::to_string),
            card: session.current().cloned().map(to_word_item),
        }
    }
}

/// Starts reviewing every stored word in stored order.
#[flutter_rust_bridge::frb(sync)]
pub fn review_start() -> ReviewResponse {
    with_review_session(|slot| {
        let words = with_library_service(|service| Ok(service.words()))
            .map_err(|err| format!("review_start failed: {err}"))?;
        *slot = Some(ReviewSession::new(words));
        Ok("Review started.")
    })
}

/// Toggles the visible face of the current card.
#[flutter_rust_bridge::frb(sync)]
pub fn review_flip() -> ReviewResponse {
    with_review_session(|slot| {
        active_review(slot, "review_flip")?.flip();
        Ok("Card flipped.")
    })
}

/// Moves to the next card, wrapping at the end.
#[flutter_rust_bridge::frb(sync)]
pub fn review_next() -> ReviewResponse {
    with_review_session(|slot| {
        active_review(slot, "review_next")?.next();
        Ok("Next card.")
    })
}

/// Current review state without changing it.
#[flutter_rust_bridge::frb(sync)]
pub fn review_current() -> ReviewResponse {
    with_review_session(|_| Ok("Review state loaded."))
}

fn with_practice_session(
    f: impl FnOnce(&mut Option<PracticeSession>) -> Result<&'static str, String>,
) -> PracticeResponse {
    let Ok(mut slot) = PRACTICE_SESSION.lock() else {
        error!("event=practice_lock module=ffi status=error error_code=lock_poisoned");
        return PracticeResponse::from_session(
            false,
            "practice session lock poisoned".to_string(),
            None,
        );
    };
    match f(&mut *slot) {
        Ok(message) => PracticeResponse::from_session(true, message.to_string(), slot.as_ref()),
        Err(message) => PracticeResponse::from_session(false, message, slot.as_ref()),
    }
}

fn active_practice<'a>(
    slot: &'a mut Option<PracticeSession>,
    operation: &str,
) -> Result<&'a mut PracticeSession, String> {
    slot.as_mut()
        .ok_or_else(|| format!("{operation} failed: no practice session, select a group first"))
}

fn with_review_session(
    f: impl FnOnce(&mut Option<ReviewSession>) -> Result<&'static str, String>,
) -> ReviewResponse {
    let Ok(mut slot) = REVIEW_SESSION.lock() else {
        error!("event=review_lock module=ffi status=error error_code=lock_poisoned");
        return ReviewResponse::from_session(false, "review session lock poisoned".to_string(), None);
    };
    match f(&mut *slot) {
        Ok(message) => ReviewResponse::from_session(true, message.to_string(), slot.as_ref()),
        Err(message) => ReviewResponse::from_session(false, message, slot.as_ref()),
    }
}

fn active_review<'a>(
    slot: &'a mut Option<ReviewSession>,
    operation: &str,
) -> Result<&'a mut ReviewSession, String> {
    slot.as_mut()
        .ok_or_else(|| format!("{operation} failed: no review session, call review_start first"))
}

fn resolve_library_db_path() -> PathBuf {
    LIBRARY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("PINJI_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(LIBRARY_DB_FILE_NAME)
        })
        .clone()
}

fn with_library_service<T>(
    f: impl FnOnce(&LibraryService<SqliteKvStore>) -> Result<T, String>,
) -> Result<T, String> {
    let service = LIBRARY_SERVICE.get_or_try_init(|| {
        let db_path = resolve_library_db_path();
        let conn = open_db(&db_path).map_err(|err| {
            error!("event=library_open module=ffi status=error error={err}");
            format!("library DB open failed: {err}")
        })?;
        Ok::<_, String>(LibraryService::new(WordStore::new(SqliteKvStore::new(conn))))
    })?;
    f(service)
}

fn to_word_item(word: Word) -> WordItem {
    WordItem {
        japanese: word.japanese,
        english: word.english,
        group: word.group,
        timestamp: word.timestamp,
    }
}

fn to_question_item(question: Question) -> QuestionItem {
    QuestionItem {
        index: saturating_u32(question.index),
        total: saturating_u32(question.total),
        prompt: question.prompt,
        options: question.options.into_iter().map(to_word_item).collect(),
    }
}

fn to_feedback_item(feedback: &AnswerFeedback, reveal_ms: u32) -> FeedbackItem {
    FeedbackItem {
        correct: feedback.correct,
        answer: to_word_item(feedback.answer.clone()),
        is_last: feedback.is_last,
        reveal_ms,
    }
}

fn to_result_item(result: &PracticeResult) -> PracticeResultItem {
    PracticeResultItem {
        total: saturating_u32(result.total),
        correct: saturating_u32(result.correct),
        incorrect_words: result
            .incorrect_words
            .iter()
            .cloned()
            .map(to_word_item)
            .collect(),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn saturating_u32_millis(value: u128) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
