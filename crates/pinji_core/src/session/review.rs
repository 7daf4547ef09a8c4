//! Flip-card review over the whole word collection.

use crate::model::word::Word;

/// Side of the card currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFace {
    Japanese,
    English,
}

/// Cycles through a fixed list of cards, one face at a time.
///
/// An empty session has no current card and ignores `next`.
#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    cards: Vec<Word>,
    current_index: usize,
    revealed: bool,
}

impl ReviewSession {
    pub fn new(cards: Vec<Word>) -> Self {
        Self {
            cards,
            current_index: 0,
            revealed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn current(&self) -> Option<&Word> {
        self.cards.get(self.current_index)
    }

    pub fn face(&self) -> CardFace {
        if self.revealed {
            CardFace::English
        } else {
            CardFace::Japanese
        }
    }

    /// Text on the visible face of the current card.
    pub fn visible_text(&self) -> Option<&str> {
        let card = self.current()?;
        Some(match self.face() {
            CardFace::Japanese => card.japanese.as_str(),
            CardFace::English => card.english.as_str(),
        })
    }

    pub fn flip(&mut self) {
        self.revealed = !self.revealed;
    }

    /// Moves to the next card, wrapping to the first, and hides the answer.
    pub fn next(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        self.revealed = false;
        self.current_index = (self.current_index + 1) % self.cards.len();
    }
}
