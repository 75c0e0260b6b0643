//! DVC start phase: deal, arrange, settle, hand off.
//!
//! Hands are dealt with raw insertion (no ordering) so each player can
//! arrange their cards freely before play; the transition to the
//! runtime phase is gated behind every player marking themselves
//! settled, and normalizes every hand on the way out.

use crate::board::Board;
use crate::card::Color;
use crate::deck::Deck;
use crate::event::{GameError, Phase};
use crate::player::Player;
use crate::runtime::{Awaiting, RuntimePhase};
use crate::view::{BoardView, GameView, PlayerView};
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Cards of each color dealt per player for 2-3 player games.
const SMALL_GAME_PER_COLOR: usize = 2;

pub struct StartPhase {
    player_ids: Vec<String>,
    deck: Deck,
    board: Option<Board>,
    settled: HashSet<String>,
    entered: bool,
}

impl StartPhase {
    /// Validate the player list (2-4 ids) and shuffle a fresh deck.
    /// Dealing happens on `enter`.
    pub fn new(player_ids: Vec<String>) -> Result<Self, GameError> {
        if !(2..=4).contains(&player_ids.len()) {
            return Err(GameError::InvalidPlayerCount);
        }
        Ok(Self {
            player_ids,
            deck: Deck::shuffled(),
            board: None,
            settled: HashSet::new(),
            entered: false,
        })
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Fill a color quota via filtered draws; off-color cards rotate to
    /// the bottom of the pile rather than being discarded.
    fn deal_color(deck: &mut Deck, player: &mut Player, color: Color, count: usize) {
        for _ in 0..count {
            match deck.draw_color(color) {
                Some(card) => player.hand_mut().add_raw(card),
                None => break,
            }
        }
    }

    /// Arrange a player's hand from a token-encoded permutation.
    pub fn reorder_hand(&mut self, player_id: &str, encoded: &str) -> Result<(), GameError> {
        let board = self.board.as_mut().ok_or(GameError::NotEntered)?;
        let player = board
            .player_mut(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        player.hand_mut().reorder_from_tokens(encoded)
    }

    /// Mark a player as done arranging.
    pub fn settled(&mut self, player_id: &str) -> Result<(), GameError> {
        let board = self.board.as_ref().ok_or(GameError::NotEntered)?;
        if board.player(player_id).is_none() {
            return Err(GameError::UnknownPlayer(player_id.to_string()));
        }
        self.settled.insert(player_id.to_string());
        Ok(())
    }

    pub fn all_settled(&self) -> bool {
        self.entered && self.settled.len() == self.player_ids.len()
    }

    /// Hand the deck, board and players over to the runtime phase. The
    /// runtime shares the same objects; nothing is copied.
    pub fn transit(self) -> Result<RuntimePhase, GameError> {
        if !self.entered {
            return Err(GameError::NotEntered);
        }
        if self.settled.len() != self.player_ids.len() {
            return Err(GameError::NotAllSettled);
        }
        let mut board = self.board.expect("entered phase always has a board");
        // Free arrangement ends here: ranked cards enter play sorted,
        // jokers stay wherever their owner left them.
        for player in board.players_mut() {
            player.hand_mut().normalize();
        }
        Ok(RuntimePhase::new(self.deck, board))
    }

    /// Start-phase snapshot: everyone is awaiting their own settle.
    pub fn build_view(&self, perspective_player_id: &str) -> Option<GameView> {
        let board = self.board.as_ref()?;
        let players = board
            .snapshot_order()
            .into_iter()
            .map(|p| PlayerView::build(p, p.id() == perspective_player_id, None))
            .collect();
        Some(GameView {
            board: BoardView {
                game_type: "DVC".to_string(),
                turn_id: 0,
                direction: board.direction(),
                current_player_index: 0,
                deck_remaining: self.deck.remaining(),
                awaiting: Awaiting::SettlePosition,
                winner_id: None,
            },
            players,
            perspective_player_id: perspective_player_id.to_string(),
        })
    }
}

impl Phase for StartPhase {
    fn enter(&mut self) {
        if self.entered {
            return;
        }
        self.entered = true;

        let mut players: Vec<Player> = self
            .player_ids
            .iter()
            .map(|id| Player::new(id.clone()))
            .collect();

        if players.len() == 4 {
            // Two randomly chosen players get 2 black + 1 white, the
            // other two get the inverse.
            let mut order: Vec<usize> = (0..players.len()).collect();
            order.shuffle(&mut rand::thread_rng());
            for (slot, &at) in order.iter().enumerate() {
                let (blacks, whites) = if slot < 2 { (2, 1) } else { (1, 2) };
                Self::deal_color(&mut self.deck, &mut players[at], Color::Black, blacks);
                Self::deal_color(&mut self.deck, &mut players[at], Color::White, whites);
            }
        } else {
            for player in &mut players {
                Self::deal_color(&mut self.deck, player, Color::Black, SMALL_GAME_PER_COLOR);
                Self::deal_color(&mut self.deck, player, Color::White, SMALL_GAME_PER_COLOR);
            }
        }

        self.board = Some(Board::new(players).expect("player count validated at construction"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use pretty_assertions::assert_eq;

    fn entered(ids: &[&str]) -> StartPhase {
        let mut phase = StartPhase::new(ids.iter().map(|s| s.to_string()).collect()).unwrap();
        phase.enter();
        phase
    }

    #[test]
    fn test_rejects_bad_player_counts() {
        assert!(StartPhase::new(vec!["A".into()]).is_err());
        assert!(StartPhase::new(vec![
            "A".into(),
            "B".into(),
            "C".into(),
            "D".into(),
            "E".into()
        ])
        .is_err());
    }

    #[test]
    fn test_two_player_deal_is_two_of_each_color() {
        let phase = entered(&["A", "B"]);
        let board = phase.board().unwrap();
        for player in board.players() {
            assert_eq!(player.hand().len(), 4);
            let blacks = player
                .hand()
                .cards()
                .iter()
                .filter(|c| c.color() == Color::Black)
                .count();
            assert_eq!(blacks, 2);
        }
        assert_eq!(phase.deck().remaining(), 26 - 8);
    }

    #[test]
    fn test_four_player_deal_splits_color_quotas() {
        let phase = entered(&["A", "B", "C", "D"]);
        let board = phase.board().unwrap();

        let mut two_black = 0;
        let mut two_white = 0;
        for player in board.players() {
            assert_eq!(player.hand().len(), 3);
            let blacks = player
                .hand()
                .cards()
                .iter()
                .filter(|c| c.color() == Color::Black)
                .count();
            match blacks {
                2 => two_black += 1,
                1 => two_white += 1,
                other => panic!("unexpected black count {other}"),
            }
        }
        assert_eq!(two_black, 2);
        assert_eq!(two_white, 2);
        assert_eq!(phase.deck().remaining(), 26 - 12);
    }

    #[test]
    fn test_enter_is_idempotent() {
        let mut phase = entered(&["A", "B"]);
        phase.enter();
        assert_eq!(phase.deck().remaining(), 26 - 8);
    }

    #[test]
    fn test_settle_barrier_gates_transit() {
        let mut phase = entered(&["A", "B"]);
        assert!(!phase.all_settled());
        phase.settled("A").unwrap();
        assert!(!phase.all_settled());
        assert!(phase.settled("ZZ").is_err());

        phase.settled("B").unwrap();
        assert!(phase.all_settled());
        assert!(phase.transit().is_ok());
    }

    #[test]
    fn test_transit_before_all_settled_fails() {
        let mut phase = entered(&["A", "B"]);
        phase.settled("A").unwrap();
        assert!(matches!(phase.transit(), Err(GameError::NotAllSettled)));
    }

    #[test]
    fn test_reorder_hand_during_start() {
        let mut phase = entered(&["A", "B"]);
        let current: String = phase
            .board()
            .unwrap()
            .player("A")
            .unwrap()
            .hand()
            .cards()
            .iter()
            .map(|c| c.token())
            .collect();
        // Reversing the dealt order is a valid permutation.
        let reversed: String = phase
            .board()
            .unwrap()
            .player("A")
            .unwrap()
            .hand()
            .cards()
            .iter()
            .rev()
            .map(|c| c.token())
            .collect();
        phase.reorder_hand("A", &reversed).unwrap();
        let now: String = phase
            .board()
            .unwrap()
            .player("A")
            .unwrap()
            .hand()
            .cards()
            .iter()
            .map(|c| c.token())
            .collect();
        if current != reversed {
            assert_ne!(now, current);
        }
        assert_eq!(now, reversed);
    }

    #[test]
    fn test_transit_normalizes_dealt_hands() {
        let mut phase = entered(&["A", "B"]);
        // Arrange A's hand in descending rank order before settling.
        let mut cards: Vec<Card> = phase
            .board()
            .unwrap()
            .player("A")
            .unwrap()
            .hand()
            .cards()
            .to_vec();
        cards.sort_by_key(|c| std::cmp::Reverse(c.sort_key()));
        let descending: String = cards.iter().map(|c| c.token()).collect();
        phase.reorder_hand("A", &descending).unwrap();
        assert!(!phase.board().unwrap().player("A").unwrap().hand().is_sorted());

        phase.settled("A").unwrap();
        phase.settled("B").unwrap();
        let runtime = phase.transit().unwrap();
        for player in runtime.board().players() {
            assert_eq!(player.hand().len(), 4);
            assert!(player.hand().is_sorted());
        }
    }

    #[test]
    fn test_start_view_hides_other_hands() {
        let mut phase = entered(&["A", "B"]);
        phase.enter();
        let view = phase.build_view("A").unwrap();
        assert_eq!(view.board.awaiting, Awaiting::SettlePosition);

        let me = view.players.iter().find(|p| p.player_id == "A").unwrap();
        assert!(me.cards.iter().all(|c| c.known));

        let other = view.players.iter().find(|p| p.player_id == "B").unwrap();
        assert!(other.cards.iter().all(|c| !c.known));
    }
}
