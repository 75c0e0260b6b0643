//! Players and guesses.

use crate::card::Card;
use crate::event::GameError;
use crate::hand::Hand;
use serde::{Deserialize, Serialize};

/// Ids beginning with this prefix (case-insensitive) belong to bots.
pub const BOT_ID_PREFIX: &str = "BOT";

/// A guess at a hidden card: either "it's the joker" or a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Guess {
    Joker,
    Number(u8),
}

/// A seated player and their hand. Players stay seated after
/// elimination (all cards revealed) until the game ends.
#[derive(Debug, Clone)]
pub struct Player {
    id: String,
    bot: bool,
    hand: Hand,
}

impl Player {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let bot = id.to_ascii_uppercase().starts_with(BOT_ID_PREFIX);
        Self {
            id,
            bot,
            hand: Hand::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_bot(&self) -> bool {
        self.bot
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    /// Number of still-hidden cards. Zero means eliminated.
    pub fn hidden_count(&self) -> usize {
        self.hand.hidden_count()
    }

    pub fn is_eliminated(&self) -> bool {
        self.hidden_count() == 0
    }

    /// Reveal the card at `index`, rejecting out-of-range indices and
    /// cards that are already face up.
    pub fn reveal_hidden_at(&mut self, index: usize) -> Result<Card, GameError> {
        let card = self.hand.get(index).ok_or(GameError::IndexOutOfRange)?;
        if card.is_revealed() {
            return Err(GameError::AlreadyRevealed);
        }
        self.hand.reveal_at(index)
    }
}
