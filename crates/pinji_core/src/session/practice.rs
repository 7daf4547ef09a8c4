//! Multiple-choice practice session.
//!
//! # Responsibility
//! - Sample a practice set from one group and walk through it.
//! - Build answer options, check answers, and collect mistakes.
//!
//! # Invariants
//! - Phases move `SelectingGroup -> ConfiguringCount -> InProgress -> Complete`;
//!   `reset` returns to `SelectingGroup` from any phase.
//! - Practice set size is `min(count, words in group)`.
//! - A finished result always has `total == correct + incorrect_words.len()`.

use crate::model::validation::{parse_word_count, ValidationError};
use crate::model::word::{GroupName, Word};
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const DEFAULT_OPTION_COUNT: usize = 4;
const DEFAULT_REVEAL_DURATION: Duration = Duration::from_millis(2000);

/// Quiz presentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeConfig {
    /// Answer options shown per question; values below 1 are raised to 1.
    pub option_count: usize,
    /// How long the host shows the revealed answer before calling `advance`.
    pub reveal_duration: Duration,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            option_count: DEFAULT_OPTION_COUNT,
            reveal_duration: DEFAULT_REVEAL_DURATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticePhase {
    SelectingGroup,
    ConfiguringCount,
    InProgress,
    Complete,
}

impl PracticePhase {
    /// Stable name used in logs and host envelopes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SelectingGroup => "selecting_group",
            Self::ConfiguringCount => "configuring_count",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }
}

/// Final tally of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeResult {
    pub total: usize,
    pub correct: usize,
    /// Question words answered wrongly, in question order.
    pub incorrect_words: Vec<Word>,
}

/// One question as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Zero-based position in the practice set.
    pub index: usize,
    pub total: usize,
    /// English prompt.
    pub prompt: String,
    /// Candidate answers. May repeat a word when the set is small.
    pub options: Vec<Word>,
}

/// Outcome of one submitted answer while it is being revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    /// The question's word, revealed as the right answer.
    pub answer: Word,
    /// Whether `advance` will finish the session.
    pub is_last: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeError {
    /// Operation is not valid in the current phase.
    WrongPhase {
        operation: &'static str,
        phase: PracticePhase,
    },
    /// Group name or word count rejected.
    Validation(ValidationError),
    /// An answer is already being revealed for this question.
    AnswerAlreadySubmitted,
    /// `advance` called before the current question was answered.
    AnswerPending,
}

impl Display for PracticeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongPhase { operation, phase } => {
                write!(f, "`{operation}` is not allowed while {}", phase.as_str())
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::AnswerAlreadySubmitted => write!(f, "answer already submitted"),
            Self::AnswerPending => write!(f, "current question has not been answered"),
        }
    }
}

impl Error for PracticeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for PracticeError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// State of one quiz run on the practice screen.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    config: PracticeConfig,
    groups: Vec<GroupName>,
    phase: PracticePhase,
    selected_group: Option<GroupName>,
    practice_set: Vec<Word>,
    current_index: usize,
    options: Vec<Word>,
    revealed: Option<AnswerFeedback>,
    incorrect_words: Vec<Word>,
    result: Option<PracticeResult>,
}

impl PracticeSession {
    /// Starts a session over the groups loaded for the selection screen.
    pub fn new(groups: Vec<GroupName>) -> Self {
        Self::with_config(groups, PracticeConfig::default())
    }

    pub fn with_config(groups: Vec<GroupName>, config: PracticeConfig) -> Self {
        let config = PracticeConfig {
            option_count: config.option_count.max(1),
            ..config
        };
        Self {
            config,
            groups,
            phase: PracticePhase::SelectingGroup,
            selected_group: None,
            practice_set: Vec::new(),
            current_index: 0,
            options: Vec::new(),
            revealed: None,
            incorrect_words: Vec::new(),
            result: None,
        }
    }

    pub fn phase(&self) -> PracticePhase {
        self.phase
    }

    pub fn groups(&self) -> &[GroupName] {
        &self.groups
    }

    pub fn selected_group(&self) -> Option<&str> {
        self.selected_group.as_deref()
    }

    pub fn practice_set(&self) -> &[Word] {
        &self.practice_set
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn incorrect_words(&self) -> &[Word] {
        &self.incorrect_words
    }

    pub fn result(&self) -> Option<&PracticeResult> {
        self.result.as_ref()
    }

    pub fn reveal_duration(&self) -> Duration {
        self.config.reveal_duration
    }

    /// Feedback for the answer currently being revealed.
    pub fn revealed(&self) -> Option<&AnswerFeedback> {
        self.revealed.as_ref()
    }

    /// Picks the group to practice.
    pub fn select_group(&mut self, name: &str) -> Result<(), PracticeError> {
        self.expect_phase("select_group", PracticePhase::SelectingGroup)?;
        if !self.groups.iter().any(|group| group == name) {
            return Err(ValidationError::UnknownGroup(name.to_string()).into());
        }
        self.selected_group = Some(name.to_string());
        self.phase = PracticePhase::ConfiguringCount;
        Ok(())
    }

    /// Samples the practice set and starts the quiz.
    ///
    /// `count` is the raw user input; `words` is the full word collection.
    /// Returns the practice set size. A group with no words completes the
    /// session immediately with an empty result.
    pub fn start_practice<R: Rng + ?Sized>(
        &mut self,
        count: &str,
        words: &[Word],
        rng: &mut R,
    ) -> Result<usize, PracticeError> {
        self.expect_phase("start_practice", PracticePhase::ConfiguringCount)?;
        let count = parse_word_count(count)?;
        let Some(group) = self.selected_group.as_deref() else {
            return Err(PracticeError::WrongPhase {
                operation: "start_practice",
                phase: self.phase,
            });
        };

        let mut pool = words
            .iter()
            .filter(|word| word.group == group)
            .cloned()
            .collect::<Vec<_>>();
        let available = pool.len();
        pool.shuffle(rng);
        pool.truncate(count);

        self.practice_set = pool;
        self.current_index = 0;
        self.options.clear();
        self.revealed = None;
        self.incorrect_words.clear();
        self.result = None;

        info!(
            "event=practice_start module=practice status=ok requested={} available={} set_size={}",
            count,
            available,
            self.practice_set.len()
        );

        if self.practice_set.is_empty() {
            self.finish();
        } else {
            self.phase = PracticePhase::InProgress;
        }
        Ok(self.practice_set.len())
    }

    /// Builds the current question with freshly shuffled options.
    ///
    /// Options are the first `option_count` words of an independent shuffle
    /// of the whole practice set. While an answer is revealed the question is
    /// returned unchanged.
    pub fn present_question<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Question, PracticeError> {
        self.expect_phase("present_question", PracticePhase::InProgress)?;
        if self.revealed.is_none() {
            let mut options = self.practice_set.clone();
            options.shuffle(rng);
            options.truncate(self.config.option_count);
            self.options = options;
        }
        Ok(self.build_question())
    }

    /// The question last presented, without reshuffling options.
    pub fn current_question(&self) -> Option<Question> {
        if self.phase != PracticePhase::InProgress {
            return None;
        }
        Some(self.build_question())
    }

    /// Checks `chosen` against the current question and reveals the answer.
    ///
    /// A wrong answer records the question's word, not the chosen option.
    pub fn submit_answer(&mut self, chosen: &Word) -> Result<AnswerFeedback, PracticeError> {
        self.expect_phase("submit_answer", PracticePhase::InProgress)?;
        if self.revealed.is_some() {
            return Err(PracticeError::AnswerAlreadySubmitted);
        }

        let answer = self.practice_set[self.current_index].clone();
        let correct = chosen.same_answer(&answer);
        if !correct {
            self.incorrect_words.push(answer.clone());
        }

        let feedback = AnswerFeedback {
            correct,
            answer,
            is_last: self.current_index + 1 == self.practice_set.len(),
        };
        self.revealed = Some(feedback.clone());
        Ok(feedback)
    }

    /// Leaves the revealed answer and moves on.
    ///
    /// Returns the phase after the move: `InProgress` for the next question
    /// or `Complete` after the last one.
    pub fn advance(&mut self) -> Result<PracticePhase, PracticeError> {
        self.expect_phase("advance", PracticePhase::InProgress)?;
        let Some(feedback) = self.revealed.take() else {
            return Err(PracticeError::AnswerPending);
        };

        self.options.clear();
        if feedback.is_last {
            self.finish();
        } else {
            self.current_index += 1;
        }
        Ok(self.phase)
    }

    /// Drops all quiz state and returns to group selection.
    pub fn reset(&mut self) {
        if self.phase == PracticePhase::InProgress {
            info!(
                "event=practice_cancel module=practice status=ok answered={} set_size={}",
                self.current_index,
                self.practice_set.len()
            );
        }
        self.phase = PracticePhase::SelectingGroup;
        self.selected_group = None;
        self.practice_set.clear();
        self.current_index = 0;
        self.options.clear();
        self.revealed = None;
        self.incorrect_words.clear();
        self.result = None;
    }

    fn finish(&mut self) {
        let total = self.practice_set.len();
        let result = PracticeResult {
            total,
            correct: total - self.incorrect_words.len(),
            incorrect_words: self.incorrect_words.clone(),
        };
        info!(
            "event=practice_complete module=practice status=ok total={} correct={}",
            result.total, result.correct
        );
        self.result = Some(result);
        self.phase = PracticePhase::Complete;
    }

    fn build_question(&self) -> Question {
        let word = &self.practice_set[self.current_index];
        Question {
            index: self.current_index,
            total: self.practice_set.len(),
            prompt: word.english.clone(),
            options: self.options.clone(),
        }
    }

    fn expect_phase(
        &self,
        operation: &'static str,
        expected: PracticePhase,
    ) -> Result<(), PracticeError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(PracticeError::WrongPhase {
                operation,
                phase: self.phase,
            })
        }
    }
}
