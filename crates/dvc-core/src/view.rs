//! Perspective-filtered game snapshots.
//!
//! A view is built for one player: their own cards (and pending card)
//! show full faces even while face down, every other player's hidden
//! cards expose only their color, and other players' pending cards are
//! never included.

use crate::card::{Card, Color};
use crate::player::Player;
use crate::runtime::Awaiting;
use serde::{Deserialize, Serialize};

/// One card as a given viewer is allowed to see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub color: Color,
    /// `None` for a joker, and also for hidden cards the viewer may
    /// not see (`known` distinguishes the two).
    pub rank: Option<u8>,
    /// Whether the face is visible to this viewer at all.
    pub known: bool,
    pub joker: bool,
    pub revealed: bool,
}

impl CardView {
    /// Full-face view (own cards, revealed cards).
    pub fn full(card: &Card) -> Self {
        Self {
            color: card.color(),
            rank: card.rank(),
            known: true,
            joker: card.is_joker(),
            revealed: card.is_revealed(),
        }
    }

    /// Back-face view: color only.
    pub fn hidden(card: &Card) -> Self {
        Self {
            color: card.color(),
            rank: None,
            known: false,
            joker: false,
            revealed: false,
        }
    }

    /// What an opponent of the card's owner sees.
    pub fn for_opponent(card: &Card) -> Self {
        if card.is_revealed() {
            Self::full(card)
        } else {
            Self::hidden(card)
        }
    }
}

/// One seated player as seen by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub player_id: String,
    pub bot: bool,
    pub hand_size: usize,
    pub hidden_count: usize,
    pub cards: Vec<CardView>,
    /// Only present for the viewer's own seat.
    pub pending: Option<CardView>,
}

impl PlayerView {
    pub fn build(player: &Player, is_self: bool, pending: Option<&Card>) -> Self {
        let cards = player
            .hand()
            .cards()
            .iter()
            .map(|c| {
                if is_self {
                    CardView::full(c)
                } else {
                    CardView::for_opponent(c)
                }
            })
            .collect();
        Self {
            player_id: player.id().to_string(),
            bot: player.is_bot(),
            hand_size: player.hand().len(),
            hidden_count: player.hidden_count(),
            cards,
            pending: if is_self {
                pending.map(CardView::full)
            } else {
                None
            },
        }
    }
}

/// Game-wide fields of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub game_type: String,
    pub turn_id: u64,
    pub direction: i8,
    /// Index of the current player within `players` (always 0, since
    /// views are ordered starting at the current seat).
    pub current_player_index: usize,
    pub deck_remaining: usize,
    pub awaiting: Awaiting,
    pub winner_id: Option<String>,
}

/// Complete snapshot delivered to a single player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub board: BoardView,
    pub players: Vec<PlayerView>,
    pub perspective_player_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hidden_card_exposes_color_only() {
        let joker = Card::joker(Color::White);
        let view = CardView::for_opponent(&joker);
        assert_eq!(view.color, Color::White);
        assert_eq!(view.rank, None);
        assert!(!view.known);
        assert!(!view.joker);
    }

    #[test]
    fn test_revealed_card_is_fully_visible_to_opponents() {
        let mut card = Card::ranked(Color::Black, 9);
        card.reveal();
        let view = CardView::for_opponent(&card);
        assert!(view.known);
        assert_eq!(view.rank, Some(9));
        assert!(view.revealed);
    }

    #[test]
    fn test_own_hidden_card_is_fully_visible_to_self() {
        let card = Card::ranked(Color::Black, 9);
        let view = CardView::full(&card);
        assert!(view.known);
        assert_eq!(view.rank, Some(9));
        assert!(!view.revealed);
    }
}
