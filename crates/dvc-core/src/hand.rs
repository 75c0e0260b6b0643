//! A player's ordered card sequence.
//!
//! Invariant between turns: the subsequence of ranked cards is sorted
//! ascending by (rank, black-before-white). Jokers are exempt and stay
//! wherever their owner put them.

use crate::card::{decode_tokens, Card, Color};
use crate::event::GameError;
use crate::player::Guess;

#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn hidden_count(&self) -> usize {
        self.cards.iter().filter(|c| !c.is_revealed()).count()
    }

    /// Auto-insert: place a ranked card before the first ranked card
    /// with a strictly larger sort key. Jokers append at the end.
    pub fn add_ordered(&mut self, card: Card) {
        let Some(key) = card.sort_key() else {
            self.cards.push(card);
            return;
        };
        let at = self
            .cards
            .iter()
            .position(|c| matches!(c.sort_key(), Some(existing) if existing > key))
            .unwrap_or(self.cards.len());
        self.cards.insert(at, card);
    }

    /// Append without ordering. Used for the initial deal, before the
    /// owner has arranged their hand.
    pub fn add_raw(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Insert at an explicit position (0..=len). Used when settling a
    /// joker, whose position is the owner's choice.
    pub fn insert_at(&mut self, index: usize, card: Card) -> Result<(), GameError> {
        if index > self.cards.len() {
            return Err(GameError::InvalidPosition);
        }
        self.cards.insert(index, card);
        Ok(())
    }

    /// Reveal the card at `index`, returning a copy of its face-up state.
    pub fn reveal_at(&mut self, index: usize) -> Result<Card, GameError> {
        let card = self
            .cards
            .get_mut(index)
            .ok_or(GameError::IndexOutOfRange)?;
        card.reveal();
        Ok(*card)
    }

    /// Check a guess against the unrevealed card at `index`.
    pub fn matches_guess(&self, index: usize, guess: Guess) -> Result<bool, GameError> {
        let card = self.cards.get(index).ok_or(GameError::IndexOutOfRange)?;
        if card.is_revealed() {
            return Err(GameError::AlreadyRevealed);
        }
        Ok(match guess {
            Guess::Joker => card.is_joker(),
            Guess::Number(n) => !card.is_joker() && card.rank() == Some(n),
        })
    }

    /// Adopt the exact ordering described by a token stream, which must
    /// be a permutation of the current hand. Revealed flags travel with
    /// their cards; only order changes.
    pub fn reorder_from_tokens(&mut self, encoded: &str) -> Result<(), GameError> {
        let ordered = Self::order_from_tokens(self.cards.clone(), encoded)?;
        self.cards = ordered;
        Ok(())
    }

    /// Match a token stream against a pool of cards, consuming one card
    /// per token. Fails unless the tokens use up the pool exactly.
    pub fn order_from_tokens(mut pool: Vec<Card>, encoded: &str) -> Result<Vec<Card>, GameError> {
        let faces = decode_tokens(encoded).map_err(|_| GameError::MalformedEncoding)?;
        if faces.len() != pool.len() {
            return Err(GameError::NotAPermutation);
        }
        let mut ordered = Vec::with_capacity(pool.len());
        for face in faces {
            let at = pool
                .iter()
                .position(|c| c.face() == face)
                .ok_or(GameError::NotAPermutation)?;
            ordered.push(pool.swap_remove(at));
        }
        Ok(ordered)
    }

    /// True when every ranked card in `cards` is in non-decreasing
    /// sort-key order, ignoring jokers.
    pub fn cards_sorted(cards: &[Card]) -> bool {
        let keys: Vec<_> = cards.iter().filter_map(|c| c.sort_key()).collect();
        keys.windows(2).all(|w| w[0] <= w[1])
    }

    pub fn is_sorted(&self) -> bool {
        Self::cards_sorted(&self.cards)
    }

    /// Restore the ordering invariant in place: ranked cards are sorted
    /// among themselves while every joker keeps its position.
    pub fn normalize(&mut self) {
        let mut ranked: Vec<Card> = self
            .cards
            .iter()
            .copied()
            .filter(|c| !c.is_joker())
            .collect();
        ranked.sort_by_key(|c| c.sort_key());
        let mut next = ranked.into_iter();
        for card in self.cards.iter_mut() {
            if !card.is_joker() {
                *card = next.next().expect("one ranked card per ranked slot");
            }
        }
    }

    /// Replace the hand contents outright. Callers are responsible for
    /// supplying a valid ordering.
    pub fn set_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
    }
}
