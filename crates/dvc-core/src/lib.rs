//! Rules engine for the Da Vinci Code deduction card game.
//!
//! This crate provides the complete game logic:
//! - The 26-card deck (two colors, ranks 0-11 plus a joker each)
//! - Ordered hands with the ascending-rank invariant
//! - A circular seating board with pending-card tracking
//! - A two-phase game: a start phase that deals and collects hand
//!   arrangements, and a runtime phase that resolves turns
//!
//! # Architecture
//!
//! The runtime is an event-driven state machine: each turn is a FIFO of
//! events drained by one resolution loop. Events that need client input
//! park the game in an `Awaiting` state; `provide_*` calls supply the
//! input and resume the loop. All mutating calls validate first and
//! reject with a [`GameError`] without touching state.
//!
//! # Modules
//!
//! - [`card`]: Cards, colors, and the token wire encoding
//! - [`deck`]: Draw/discard piles and the filtered color draw
//! - [`hand`]: Ordered card sequences and guess checking
//! - [`board`]: The seating ring and pending cards
//! - [`start`] / [`runtime`]: The two game phases
//! - [`view`]: Perspective-filtered snapshots for clients

pub mod board;
pub mod bot;
pub mod card;
pub mod deck;
pub mod event;
pub mod hand;
pub mod player;
pub mod runtime;
pub mod start;
pub mod view;

// Re-export commonly used types
pub use board::Board;
pub use bot::Bot;
pub use card::{decode_tokens, Card, Color, DecodeError, TOKEN_END};
pub use deck::{Deck, DECK_SIZE};
pub use event::{EventQueue, GameError, Phase, Runtime};
pub use hand::Hand;
pub use player::{Guess, Player, BOT_ID_PREFIX};
pub use runtime::{Awaiting, RuntimePhase};
pub use start::StartPhase;
pub use view::{BoardView, CardView, GameView, PlayerView};
