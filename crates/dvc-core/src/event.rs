//! Minimal event/phase framework shared by games built on this engine.
//!
//! A game is a Start phase that deals and seats players, then a Runtime
//! phase that resolves turns. Turn resolution is driven by a FIFO of
//! enum events owned by the runtime's resolution loop: executing one
//! event may enqueue follow-ups, and an event that still needs client
//! input parks the game in an "awaiting" state until the input arrives.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Rejections and structural precondition failures.
///
/// Everything here is local and recoverable from the caller's point of
/// view: a rejected call leaves the game untouched and may be retried
/// with corrected input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("not your turn")]
    NotYourTurn,

    #[error("call does not match the awaited input")]
    WrongAwaitedState,

    #[error("game is over")]
    GameOver,

    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    #[error("games require 2-4 players")]
    InvalidPlayerCount,

    #[error("cannot target your own hand")]
    SelfTarget,

    #[error("card index out of range")]
    IndexOutOfRange,

    #[error("card is already revealed")]
    AlreadyRevealed,

    #[error("malformed hand encoding")]
    MalformedEncoding,

    #[error("encoded hand is not a permutation of the actual hand")]
    NotAPermutation,

    #[error("ranked cards must stay in ascending order")]
    OrderViolation,

    #[error("a joker needs an explicit insert position")]
    PositionRequired,

    #[error("insert position out of range")]
    InvalidPosition,

    #[error("cannot shrink the seating ring below 2 players")]
    RingTooSmall,

    #[error("not all players have settled")]
    NotAllSettled,

    #[error("phase has not been entered")]
    NotEntered,
}

/// FIFO of not-yet-executed events.
#[derive(Debug, Clone, Default)]
pub struct EventQueue<E> {
    queue: VecDeque<E>,
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, event: E) {
        self.queue.push_back(event);
    }

    pub fn poll(&mut self) -> Option<E> {
        self.queue.pop_front()
    }

    pub fn peek(&self) -> Option<&E> {
        self.queue.front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// A game phase with an entry hook.
pub trait Phase {
    /// Perform phase entry side effects. Idempotent: entering twice is
    /// a no-op.
    fn enter(&mut self);
}

/// A runtime phase that can simulate itself to completion without
/// further client input (bot-only games).
pub trait Runtime: Phase {
    /// Drive the game until it finishes or a human input is required.
    /// Returns the winner's id, if the game ended with one.
    fn run(&mut self) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue_is_fifo() {
        let mut q = EventQueue::new();
        q.enqueue(1);
        q.enqueue(2);
        q.enqueue(3);
        assert_eq!(q.len(), 3);
        assert_eq!(q.peek(), Some(&1));
        assert_eq!(q.poll(), Some(1));
        assert_eq!(q.poll(), Some(2));
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.poll(), None);
    }
}
