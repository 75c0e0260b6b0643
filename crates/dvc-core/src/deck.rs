//! Draw and discard piles.
//!
//! The deck is built once as the fixed 26-card set and shuffled. DVC
//! never discards mid-game, but the framework-level reshuffle rule
//! (exhausted draw pile refills from the discard pile, keeping the most
//! recent discard visible) is preserved for games that do.

use crate::card::{Card, Color};
use rand::seq::SliceRandom;
use std::collections::VecDeque;

/// Number of cards in a full DVC deck.
pub const DECK_SIZE: usize = 26;

#[derive(Debug, Clone)]
pub struct Deck {
    draw_pile: VecDeque<Card>,
    discard_pile: VecDeque<Card>,
}

impl Deck {
    /// Build the full 26-card set and shuffle it.
    pub fn shuffled() -> Self {
        let mut cards = Self::full_set();
        cards.shuffle(&mut rand::thread_rng());
        Self::from_cards(cards)
    }

    /// A deck with the given draw pile order, top first. No shuffling;
    /// callers that need a stacked deck (tests, replays) use this.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            draw_pile: cards.into(),
            discard_pile: VecDeque::new(),
        }
    }

    fn full_set() -> Vec<Card> {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for color in Color::ALL {
            for rank in 0..=11 {
                cards.push(Card::ranked(color, rank));
            }
            cards.push(Card::joker(color));
        }
        cards
    }

    pub fn remaining(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn discard_size(&self) -> usize {
        self.discard_pile.len()
    }

    pub fn total(&self) -> usize {
        self.draw_pile.len() + self.discard_pile.len()
    }

    /// Draw the top card, refilling from the discard pile first if the
    /// draw pile is exhausted. Returns `None` only when both piles are
    /// empty.
    pub fn draw(&mut self) -> Option<Card> {
        if self.draw_pile.is_empty() {
            self.reshuffle_from_discards();
        }
        self.draw_pile.pop_front()
    }

    /// Put a card on top of the discard pile.
    pub fn discard(&mut self, card: Card) {
        self.discard_pile.push_front(card);
    }

    /// Return a card to the bottom of the draw pile without shuffling.
    pub fn put_bottom(&mut self, card: Card) {
        self.draw_pile.push_back(card);
    }

    /// Filtered draw: rotate through the draw pile looking for the first
    /// card of `color`, returning every non-matching card to the bottom
    /// in its original relative order. Deterministic rotation, not a
    /// re-shuffle. Returns `None` if no card of that color remains.
    pub fn draw_color(&mut self, color: Color) -> Option<Card> {
        let attempts = self.remaining();
        let mut stash = Vec::new();
        let mut found = None;
        for _ in 0..attempts {
            match self.draw() {
                Some(card) if card.color() == color => {
                    found = Some(card);
                    break;
                }
                Some(card) => stash.push(card),
                None => break,
            }
        }
        for card in stash {
            self.put_bottom(card);
        }
        found
    }

    /// Shuffle all but the most recent discard back into the draw pile.
    fn reshuffle_from_discards(&mut self) {
        if self.discard_pile.is_empty() {
            return;
        }
        let top = self.discard_pile.pop_front();
        let mut rest: Vec<Card> = self.discard_pile.drain(..).collect();
        if let Some(top) = top {
            self.discard_pile.push_front(top);
        }
        rest.shuffle(&mut rand::thread_rng());
        self.draw_pile.extend(rest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_deck_has_26_cards() {
        let deck = Deck::shuffled();
        assert_eq!(deck.remaining(), 26);
        assert_eq!(deck.discard_size(), 0);
    }

    #[test]
    fn test_draw_depletes() {
        let mut deck = Deck::shuffled();
        for _ in 0..26 {
            assert!(deck.draw().is_some());
        }
        assert_eq!(deck.remaining(), 0);
        assert!(deck.draw().is_none());
    }

    #[test]
    fn test_filtered_draw_finds_color_and_preserves_order() {
        let mut deck = Deck::from_cards(vec![
            Card::ranked(Color::White, 1),
            Card::ranked(Color::White, 2),
            Card::ranked(Color::Black, 5),
            Card::ranked(Color::White, 3),
        ]);

        let drawn = deck.draw_color(Color::Black).unwrap();
        assert_eq!(drawn.face(), (Color::Black, Some(5)));
        assert_eq!(deck.remaining(), 3);

        // W3 was never touched; W1/W2 rotated to the bottom behind it,
        // keeping their relative order.
        assert_eq!(deck.draw().unwrap().face(), (Color::White, Some(3)));
        assert_eq!(deck.draw().unwrap().face(), (Color::White, Some(1)));
        assert_eq!(deck.draw().unwrap().face(), (Color::White, Some(2)));
    }

    #[test]
    fn test_filtered_draw_without_match_leaves_pile_intact() {
        let mut deck = Deck::from_cards(vec![
            Card::ranked(Color::White, 1),
            Card::ranked(Color::White, 2),
        ]);
        assert!(deck.draw_color(Color::Black).is_none());
        assert_eq!(deck.remaining(), 2);
        assert_eq!(deck.draw().unwrap().face(), (Color::White, Some(1)));
    }

    #[test]
    fn test_reshuffle_keeps_top_discard_visible() {
        let mut deck = Deck::from_cards(vec![]);
        deck.discard(Card::ranked(Color::Black, 1));
        deck.discard(Card::ranked(Color::Black, 2));
        deck.discard(Card::ranked(Color::Black, 3)); // most recent

        let drawn = deck.draw().unwrap();
        assert_ne!(drawn.face(), (Color::Black, Some(3)));
        assert_eq!(deck.discard_size(), 1);
        assert_eq!(deck.remaining(), 1);
    }
}
