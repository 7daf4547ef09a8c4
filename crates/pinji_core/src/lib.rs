//! Core vocabulary logic for PinJi.
//! This crate owns the group/word integrity rules and quiz state.

pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod session;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::library::{Library, LibraryStats};
pub use model::validation::ValidationError;
pub use model::word::{GroupName, Word};
pub use service::library_service::{
    DuplicateGroupPolicy, LibraryConfig, LibraryError, LibraryResult, LibraryService,
};
pub use session::practice::{
    AnswerFeedback, PracticeConfig, PracticeError, PracticePhase, PracticeResult,
    PracticeSession, Question,
};
pub use session::review::{CardFace, ReviewSession};
pub use store::kv::{KvStore, SqliteKvStore};
pub use store::word_store::{WordStore, GROUPS_KEY, WORDS_KEY};
pub use store::{StoreError, StoreResult};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
