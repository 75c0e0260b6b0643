//! Circular seating board.
//!
//! The ring is a plain vector of seated players plus a current index
//! and a direction sign; stepping is modular index arithmetic. The
//! board also tracks each player's pending card (drawn but not yet
//! settled into the hand), keyed by player id.

use crate::card::Card;
use crate::event::GameError;
use crate::player::Player;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Board {
    players: Vec<Player>,
    current: usize,
    direction: i8,
    turn_count: u64,
    pending: HashMap<String, Card>,
}

impl Board {
    /// Seat the players in the given order. At least 2 seats required.
    pub fn new(players: Vec<Player>) -> Result<Self, GameError> {
        if players.len() < 2 {
            return Err(GameError::InvalidPlayerCount);
        }
        Ok(Self {
            players,
            current: 0,
            direction: 1,
            turn_count: 0,
            pending: HashMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn direction(&self) -> i8 {
        self.direction
    }

    pub fn turn_count(&self) -> u64 {
        self.turn_count
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn current_player_mut(&mut self) -> &mut Player {
        &mut self.players[self.current]
    }

    /// The player who would be current after one step, without stepping.
    pub fn peek_next(&self) -> &Player {
        let len = self.players.len() as i64;
        let next = (self.current as i64 + self.direction as i64).rem_euclid(len) as usize;
        &self.players[next]
    }

    /// Advance `k` seats in the current direction.
    pub fn step(&mut self, k: usize) {
        let len = self.players.len() as i64;
        let delta = self.direction as i64 * k as i64;
        self.current = (self.current as i64 + delta).rem_euclid(len) as usize;
    }

    /// Flip direction; the current seat pointer does not move.
    pub fn reverse(&mut self) {
        self.direction = -self.direction;
    }

    pub fn tick_turn(&mut self) {
        self.turn_count += 1;
    }

    /// Seating order starting at the current seat, in ring order.
    pub fn snapshot_order(&self) -> Vec<&Player> {
        let len = self.players.len();
        (0..len)
            .map(|i| &self.players[(self.current + i) % len])
            .collect()
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id() == id)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    /// Remove a seat. Fails if the ring would shrink below 2; returns
    /// false if the id is not seated. The player's pending card, if
    /// any, leaves with them.
    pub fn remove(&mut self, id: &str) -> Result<bool, GameError> {
        let Some(at) = self.players.iter().position(|p| p.id() == id) else {
            return Ok(false);
        };
        if self.players.len() == 2 {
            return Err(GameError::RingTooSmall);
        }
        self.pending.remove(id);
        self.players.remove(at);
        if at < self.current {
            self.current -= 1;
        } else if self.current >= self.players.len() {
            self.current = 0;
        }
        Ok(true)
    }

    /// Insert a new seat immediately after the named one (in ring
    /// order). Fails if the anchor id is not seated.
    pub fn insert_after(&mut self, after_id: &str, player: Player) -> Result<(), GameError> {
        let at = self
            .players
            .iter()
            .position(|p| p.id() == after_id)
            .ok_or_else(|| GameError::UnknownPlayer(after_id.to_string()))?;
        self.players.insert(at + 1, player);
        if at + 1 <= self.current {
            self.current += 1;
        }
        Ok(())
    }

    /// Players still holding at least one hidden card.
    pub fn active_player_count(&self) -> usize {
        self.players.iter().filter(|p| !p.is_eliminated()).count()
    }

    /// The sole surviving player, if exactly the win condition holds.
    pub fn survivor(&self) -> Option<&Player> {
        self.players.iter().find(|p| !p.is_eliminated())
    }

    // ----- pending cards -----

    pub fn set_pending(&mut self, player_id: &str, card: Card) {
        self.pending.insert(player_id.to_string(), card);
    }

    pub fn pending(&self, player_id: &str) -> Option<&Card> {
        self.pending.get(player_id)
    }

    pub fn has_pending(&self, player_id: &str) -> bool {
        self.pending.contains_key(player_id)
    }

    pub fn take_pending(&mut self, player_id: &str) -> Option<Card> {
        self.pending.remove(player_id)
    }

    /// Flip a pending card face up in place (the wrong-guess penalty).
    pub fn reveal_pending(&mut self, player_id: &str) {
        if let Some(card) = self.pending.get_mut(player_id) {
            card.reveal();
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
