//! DVC runtime phase: the resumable multi-step turn state machine.
//!
//! A turn is a chain of events (draw, guess, reveal, settle) drained
//! from a FIFO by one resolution loop. An event that needs client
//! input parks the game in the matching `Awaiting` state; the next
//! `provide_*` call supplies the input, executes the event, and drains
//! the queue until the next input is needed or the turn ends. When the
//! queue drains completely the turn is over: the counter ticks, victory
//! is re-evaluated, and the seat pointer advances into the next turn.

use crate::board::Board;
use crate::bot::Bot;
use crate::card::{Card, Color};
use crate::deck::Deck;
use crate::event::{EventQueue, GameError, Phase, Runtime};
use crate::hand::Hand;
use crate::player::Guess;
use crate::view::{BoardView, GameView, PlayerView};
use serde::{Deserialize, Serialize};

/// Cap on simulation steps in `run`, in case a bot stops making progress.
const MAX_SIMULATION_STEPS: usize = 10_000;

/// Which client input the engine expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Awaiting {
    None,
    DrawColor,
    GuessSelection,
    RevealDecision,
    SettlePosition,
    SelfRevealChoice,
}

/// Turn-resolution events. Executing one may enqueue follow-ups; the
/// chaining lives entirely in the resolution loop below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnEvent {
    /// Current player picks a color, filtered-draws a pending card.
    Draw,
    /// Current player guesses a hidden card in another hand.
    Guess,
    /// Outcome of a guess; correct ones need a continue/stop decision.
    Reveal { correct: bool },
    /// Commit the pending card (if any) into the hand; ends the turn.
    Settle,
}

pub struct RuntimePhase {
    deck: Deck,
    board: Board,
    queue: EventQueue<TurnEvent>,
    awaiting: Awaiting,
    /// The head event currently parked on client input.
    parked: Option<TurnEvent>,
    turn_id: u64,
    winner_id: Option<String>,
    finished: bool,
    entered: bool,
}

impl RuntimePhase {
    pub fn new(deck: Deck, board: Board) -> Self {
        Self {
            deck,
            board,
            queue: EventQueue::new(),
            awaiting: Awaiting::None,
            parked: None,
            turn_id: 0,
            winner_id: None,
            finished: false,
            entered: false,
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn awaiting(&self) -> Awaiting {
        self.awaiting
    }

    pub fn turn_id(&self) -> u64 {
        self.turn_id
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Winner id once finished; `None` while running or on a draw.
    pub fn winner_id(&self) -> Option<&str> {
        self.winner_id.as_deref()
    }

    // ----- turn lifecycle -----

    /// Drain the queue until an event parks on client input or the turn
    /// (and possibly the game) ends.
    fn pump(&mut self) {
        loop {
            if self.finished {
                self.queue.clear();
                self.parked = None;
                self.awaiting = Awaiting::None;
                return;
            }
            let Some(event) = self.queue.poll() else {
                self.end_turn();
                continue;
            };
            if let Some(need) = self.input_needed(&event) {
                self.awaiting = need;
                self.parked = Some(event);
                return;
            }
            self.execute_auto(event);
        }
    }

    /// Which input, if any, an event needs before it can execute.
    fn input_needed(&self, event: &TurnEvent) -> Option<Awaiting> {
        let current_id = self.board.current_player().id();
        match event {
            TurnEvent::Draw => Some(Awaiting::DrawColor),
            TurnEvent::Guess => Some(Awaiting::GuessSelection),
            TurnEvent::Reveal { correct: true } => Some(Awaiting::RevealDecision),
            TurnEvent::Reveal { correct: false } => {
                // No drawn card to forfeit: the penalty becomes a
                // self-reveal chosen by the guesser.
                if self.deck.remaining() == 0 && !self.board.has_pending(current_id) {
                    Some(Awaiting::SelfRevealChoice)
                } else {
                    None
                }
            }
            TurnEvent::Settle => {
                if self.board.has_pending(current_id) {
                    Some(Awaiting::SettlePosition)
                } else {
                    None
                }
            }
        }
    }

    /// Execute an event that needs no client input.
    fn execute_auto(&mut self, event: TurnEvent) {
        match event {
            TurnEvent::Reveal { correct: false } => {
                // Wrong guess: the drawn card is forfeited face up.
                let current_id = self.board.current_player().id().to_string();
                self.board.reveal_pending(&current_id);
                self.queue.enqueue(TurnEvent::Settle);
            }
            // Settle with no pending card is a no-op; the drained queue
            // ends the turn.
            TurnEvent::Settle => {}
            TurnEvent::Draw | TurnEvent::Guess | TurnEvent::Reveal { correct: true } => {
                debug_assert!(false, "event always parks on input");
            }
        }
    }

    fn begin_turn(&mut self) {
        while !self.finished && self.board.current_player().is_eliminated() {
            self.advance_seat();
        }
        if self.finished {
            return;
        }
        if self.deck.remaining() > 0 {
            self.queue.enqueue(TurnEvent::Draw);
        } else {
            self.queue.enqueue(TurnEvent::Guess);
        }
    }

    fn advance_seat(&mut self) {
        self.board.step(1);
        self.board.tick_turn();
        self.check_victory();
    }

    fn end_turn(&mut self) {
        self.turn_id += 1;
        self.check_victory();
        if !self.finished {
            self.advance_seat();
        }
        if !self.finished {
            self.begin_turn();
        }
    }

    fn check_victory(&mut self) {
        if self.finished {
            return;
        }
        if self.board.active_player_count() <= 1 {
            self.winner_id = self.board.survivor().map(|p| p.id().to_string());
            self.finished = true;
        }
    }

    /// Common gate for every input call: game running, awaited state
    /// matches, caller holds the turn.
    fn expect(&self, awaiting: Awaiting, player_id: &str) -> Result<(), GameError> {
        if self.finished {
            return Err(GameError::GameOver);
        }
        if self.awaiting != awaiting {
            return Err(GameError::WrongAwaitedState);
        }
        if self.board.current_player().id() != player_id {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    // ----- client inputs -----

    /// Filtered-draw a card of the chosen color; it becomes the
    /// player's pending card. Falls back to a plain draw when no card
    /// of that color remains. Always moves on to guess selection.
    pub fn provide_draw_color(&mut self, player_id: &str, color: Color) -> Result<(), GameError> {
        self.expect(Awaiting::DrawColor, player_id)?;
        let card = self.deck.draw_color(color).or_else(|| self.deck.draw());
        if let Some(card) = card {
            self.board.set_pending(player_id, card);
        }
        self.parked = None;
        self.awaiting = Awaiting::None;
        self.queue.enqueue(TurnEvent::Guess);
        self.pump();
        Ok(())
    }

    /// Guess a hidden card in another player's hand.
    ///
    /// A match reveals the target card immediately and asks the guesser
    /// whether to continue. A miss forfeits the pending drawn card face
    /// up and settles, or demands a self-reveal when there is no drawn
    /// card to forfeit.
    pub fn provide_guess(
        &mut self,
        player_id: &str,
        target_player_id: &str,
        target_index: usize,
        guess: Guess,
    ) -> Result<(), GameError> {
        self.expect(Awaiting::GuessSelection, player_id)?;
        if target_player_id == player_id {
            return Err(GameError::SelfTarget);
        }
        let target = self
            .board
            .player(target_player_id)
            .ok_or_else(|| GameError::UnknownPlayer(target_player_id.to_string()))?;
        let correct = target.hand().matches_guess(target_index, guess)?;

        self.parked = None;
        self.awaiting = Awaiting::None;
        if correct {
            let target = self
                .board
                .player_mut(target_player_id)
                .expect("target validated above");
            target.hand_mut().reveal_at(target_index)?;
            self.check_victory();
        }
        self.queue.enqueue(TurnEvent::Reveal { correct });
        self.pump();
        Ok(())
    }

    /// After a correct guess: keep guessing, or stop and settle.
    pub fn provide_reveal_decision(
        &mut self,
        player_id: &str,
        continue_guessing: bool,
    ) -> Result<(), GameError> {
        self.expect(Awaiting::RevealDecision, player_id)?;
        self.parked = None;
        self.awaiting = Awaiting::None;
        if continue_guessing {
            self.queue.enqueue(TurnEvent::Guess);
        } else {
            self.queue.enqueue(TurnEvent::Settle);
        }
        self.pump();
        Ok(())
    }

    /// Reveal one of the caller's own hidden cards as the wrong-guess
    /// penalty when the deck is empty and no card was drawn.
    pub fn provide_self_reveal(&mut self, player_id: &str, own_index: usize) -> Result<(), GameError> {
        self.expect(Awaiting::SelfRevealChoice, player_id)?;
        self.board
            .current_player_mut()
            .reveal_hidden_at(own_index)?;
        self.parked = None;
        self.awaiting = Awaiting::None;
        self.check_victory();
        self.queue.enqueue(TurnEvent::Settle);
        self.pump();
        Ok(())
    }

    /// Commit the pending card into the hand and end the turn. Jokers
    /// need an explicit position; ranked cards auto-sort and ignore it.
    pub fn provide_settle_position(
        &mut self,
        player_id: &str,
        insert_index: Option<usize>,
    ) -> Result<(), GameError> {
        self.expect(Awaiting::SettlePosition, player_id)?;
        let pending = *self
            .board
            .pending(player_id)
            .ok_or(GameError::WrongAwaitedState)?;
        if pending.is_joker() {
            let index = insert_index.ok_or(GameError::PositionRequired)?;
            if index > self.board.current_player().hand().len() {
                return Err(GameError::InvalidPosition);
            }
            let card = self.board.take_pending(player_id).expect("checked above");
            self.board
                .current_player_mut()
                .hand_mut()
                .insert_at(index, card)?;
        } else {
            let card = self.board.take_pending(player_id).expect("checked above");
            self.board.current_player_mut().hand_mut().add_ordered(card);
        }
        self.parked = None;
        self.awaiting = Awaiting::None;
        self.pump();
        Ok(())
    }

    /// Settle by supplying the complete desired hand ordering as a
    /// token stream. The pending card joins the hand first; the
    /// encoding must be a permutation of hand + pending card and must
    /// keep ranked cards in ascending order (jokers go anywhere).
    pub fn provide_settle_hand(&mut self, player_id: &str, encoded: &str) -> Result<(), GameError> {
        self.expect(Awaiting::SettlePosition, player_id)?;
        let pending = *self
            .board
            .pending(player_id)
            .ok_or(GameError::WrongAwaitedState)?;
        let mut pool: Vec<Card> = self.board.current_player().hand().cards().to_vec();
        pool.push(pending);
        let ordered = Hand::order_from_tokens(pool, encoded)?;
        if !Hand::cards_sorted(&ordered) {
            return Err(GameError::OrderViolation);
        }

        self.board.take_pending(player_id);
        self.board.current_player_mut().hand_mut().set_cards(ordered);
        self.parked = None;
        self.awaiting = Awaiting::None;
        self.pump();
        Ok(())
    }

    // ----- views -----

    /// Snapshot for one player, ordered by seating from the current
    /// seat. The viewer sees their own cards and pending card in full;
    /// everyone else's hidden cards expose only their color.
    pub fn build_view(&self, perspective_player_id: &str) -> GameView {
        let players = self
            .board
            .snapshot_order()
            .into_iter()
            .map(|p| {
                let is_self = p.id() == perspective_player_id;
                PlayerView::build(p, is_self, self.board.pending(p.id()))
            })
            .collect();
        GameView {
            board: BoardView {
                game_type: "DVC".to_string(),
                turn_id: self.turn_id,
                direction: self.board.direction(),
                current_player_index: 0,
                deck_remaining: self.deck.remaining(),
                awaiting: self.awaiting,
                winner_id: self.winner_id.clone(),
            },
            players,
            perspective_player_id: perspective_player_id.to_string(),
        }
    }
}

impl Phase for RuntimePhase {
    fn enter(&mut self) {
        if self.entered {
            return;
        }
        self.entered = true;
        self.begin_turn();
        self.pump();
    }
}

impl Runtime for RuntimePhase {
    /// Simulate bot turns until the game finishes or a human's input is
    /// required. Bot-only games run to completion.
    fn run(&mut self) -> Option<String> {
        self.enter();
        let mut bot = Bot::new();
        for _ in 0..MAX_SIMULATION_STEPS {
            if self.finished || !self.board.current_player().is_bot() {
                break;
            }
            if !bot.act(self) {
                break;
            }
        }
        self.winner_id.clone()
    }
}
