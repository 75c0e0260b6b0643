//! Game session management.
//!
//! A session wraps one game and its current phase. Start-phase calls
//! (reorder, settle) and runtime inputs are dispatched to whichever
//! phase is live; calls for the wrong phase are rejected the same way
//! the engine rejects inputs in the wrong awaited state. Bot seats are
//! settled automatically and play their turns whenever control reaches
//! them.

use dvc_core::{Color, GameError, GameView, Guess, Phase, Runtime, RuntimePhase, StartPhase};
use uuid::Uuid;

enum GameSlot {
    Start(StartPhase),
    Runtime(RuntimePhase),
    /// Held only while the start phase is being consumed by the
    /// transition; never observable between calls.
    Transitioning,
}

pub struct GameSession {
    pub id: Uuid,
    player_ids: Vec<String>,
    slot: GameSlot,
}

impl GameSession {
    /// Create a game and deal hands. Bot seats are settled immediately;
    /// a bot-only game therefore plays out to completion right here.
    pub fn new(player_ids: Vec<String>) -> Result<Self, GameError> {
        let mut phase = StartPhase::new(player_ids.clone())?;
        phase.enter();

        let bots: Vec<String> = phase
            .board()
            .map(|b| {
                b.players()
                    .iter()
                    .filter(|p| p.is_bot())
                    .map(|p| p.id().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let mut session = Self {
            id: Uuid::new_v4(),
            player_ids,
            slot: GameSlot::Start(phase),
        };
        for id in bots {
            session.settled(&id)?;
        }
        Ok(session)
    }

    pub fn player_ids(&self) -> &[String] {
        &self.player_ids
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.player_ids.iter().any(|id| id == player_id)
    }

    pub fn is_finished(&self) -> bool {
        matches!(&self.slot, GameSlot::Runtime(rt) if rt.is_finished())
    }

    pub fn winner_id(&self) -> Option<&str> {
        match &self.slot {
            GameSlot::Runtime(rt) => rt.winner_id(),
            _ => None,
        }
    }

    /// Rearrange a hand during the start phase.
    pub fn reorder_hand(&mut self, player_id: &str, encoded: &str) -> Result<(), GameError> {
        match &mut self.slot {
            GameSlot::Start(phase) => phase.reorder_hand(player_id, encoded),
            _ => Err(GameError::WrongAwaitedState),
        }
    }

    /// Mark a player as done arranging. When the last player settles,
    /// the game transitions to the runtime phase and bot seats start
    /// playing.
    pub fn settled(&mut self, player_id: &str) -> Result<(), GameError> {
        let GameSlot::Start(phase) = &mut self.slot else {
            return Err(GameError::WrongAwaitedState);
        };
        phase.settled(player_id)?;
        if !phase.all_settled() {
            return Ok(());
        }
        let GameSlot::Start(phase) = std::mem::replace(&mut self.slot, GameSlot::Transitioning)
        else {
            unreachable!("checked above");
        };
        let mut runtime = phase.transit()?;
        runtime.enter();
        runtime.run();
        self.slot = GameSlot::Runtime(runtime);
        Ok(())
    }

    fn runtime_mut(&mut self) -> Result<&mut RuntimePhase, GameError> {
        match &mut self.slot {
            GameSlot::Runtime(rt) => Ok(rt),
            _ => Err(GameError::WrongAwaitedState),
        }
    }

    pub fn draw_color(&mut self, player_id: &str, color: Color) -> Result<(), GameError> {
        let rt = self.runtime_mut()?;
        rt.provide_draw_color(player_id, color)?;
        rt.run();
        Ok(())
    }

    pub fn guess(
        &mut self,
        player_id: &str,
        target_player_id: &str,
        target_index: usize,
        guess: Guess,
    ) -> Result<(), GameError> {
        let rt = self.runtime_mut()?;
        rt.provide_guess(player_id, target_player_id, target_index, guess)?;
        rt.run();
        Ok(())
    }

    pub fn reveal_decision(
        &mut self,
        player_id: &str,
        continue_guessing: bool,
    ) -> Result<(), GameError> {
        let rt = self.runtime_mut()?;
        rt.provide_reveal_decision(player_id, continue_guessing)?;
        rt.run();
        Ok(())
    }

    pub fn self_reveal(&mut self, player_id: &str, own_index: usize) -> Result<(), GameError> {
        let rt = self.runtime_mut()?;
        rt.provide_self_reveal(player_id, own_index)?;
        rt.run();
        Ok(())
    }

    pub fn settle_position(
        &mut self,
        player_id: &str,
        insert_index: Option<usize>,
    ) -> Result<(), GameError> {
        let rt = self.runtime_mut()?;
        rt.provide_settle_position(player_id, insert_index)?;
        rt.run();
        Ok(())
    }

    pub fn settle_hand(&mut self, player_id: &str, encoded: &str) -> Result<(), GameError> {
        let rt = self.runtime_mut()?;
        rt.provide_settle_hand(player_id, encoded)?;
        rt.run();
        Ok(())
    }

    /// Perspective-filtered snapshot for one player.
    pub fn view(&self, player_id: &str) -> Option<GameView> {
        match &self.slot {
            GameSlot::Start(phase) => phase.build_view(player_id),
            GameSlot::Runtime(rt) => Some(rt.build_view(player_id)),
            GameSlot::Transitioning => None,
        }
    }
}
