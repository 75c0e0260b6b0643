//! Naive automated player.
//!
//! The bot answers whichever input the runtime is awaiting with a
//! legal, mostly random choice. It has no memory of revealed
//! information; it exists to fill seats and to drive simulations.

use crate::card::Color;
use crate::player::Guess;
use crate::runtime::{Awaiting, RuntimePhase};
use rand::prelude::*;

pub struct Bot {
    rng: StdRng,
}

impl Bot {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Supply one input for the currently awaited state on behalf of
    /// the current player. Returns false when no input was produced
    /// (game over, nothing awaited, or no legal choice found).
    pub fn act(&mut self, game: &mut RuntimePhase) -> bool {
        if game.is_finished() {
            return false;
        }
        let player_id = game.board().current_player().id().to_string();
        match game.awaiting() {
            Awaiting::None => false,
            Awaiting::DrawColor => {
                let color = if self.rng.gen_bool(0.5) {
                    Color::Black
                } else {
                    Color::White
                };
                game.provide_draw_color(&player_id, color).is_ok()
            }
            Awaiting::GuessSelection => {
                let Some((target_id, index)) = self.pick_target(game, &player_id) else {
                    return false;
                };
                let guess = self.pick_guess();
                game.provide_guess(&player_id, &target_id, index, guess).is_ok()
            }
            // Bank the safe reveal rather than risk another guess.
            Awaiting::RevealDecision => game.provide_reveal_decision(&player_id, false).is_ok(),
            Awaiting::SettlePosition => {
                let joker = game
                    .board()
                    .pending(&player_id)
                    .map(|c| c.is_joker())
                    .unwrap_or(false);
                let index = if joker {
                    let len = game.board().current_player().hand().len();
                    Some(self.rng.gen_range(0..=len))
                } else {
                    None
                };
                game.provide_settle_position(&player_id, index).is_ok()
            }
            Awaiting::SelfRevealChoice => {
                let hidden: Vec<usize> = game
                    .board()
                    .current_player()
                    .hand()
                    .cards()
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| !c.is_revealed())
                    .map(|(i, _)| i)
                    .collect();
                let Some(&at) = hidden.choose(&mut self.rng) else {
                    return false;
                };
                game.provide_self_reveal(&player_id, at).is_ok()
            }
        }
    }

    /// A random opponent still holding hidden cards, and a random
    /// hidden slot in their hand.
    fn pick_target(&mut self, game: &RuntimePhase, player_id: &str) -> Option<(String, usize)> {
        let candidates: Vec<(String, Vec<usize>)> = game
            .board()
            .players()
            .iter()
            .filter(|p| p.id() != player_id && !p.is_eliminated())
            .map(|p| {
                let hidden = p
                    .hand()
                    .cards()
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| !c.is_revealed())
                    .map(|(i, _)| i)
                    .collect();
                (p.id().to_string(), hidden)
            })
            .collect();
        let (id, indices) = candidates.choose(&mut self.rng)?;
        let at = *indices.choose(&mut self.rng)?;
        Some((id.clone(), at))
    }

    /// Uniform over the 13 possible faces of one color: twelve ranks
    /// plus the joker.
    fn pick_guess(&mut self) -> Guess {
        let pick = self.rng.gen_range(0..13);
        if pick == 12 {
            Guess::Joker
        } else {
            Guess::Number(pick)
        }
    }
}

impl Default for Bot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Phase, Runtime};
    use crate::start::StartPhase;

    #[test]
    fn test_bot_only_game_runs_to_completion() {
        let mut start = StartPhase::new(vec!["BOT1".into(), "BOT2".into()]).unwrap();
        start.enter();
        start.settled("BOT1").unwrap();
        start.settled("BOT2").unwrap();
        let mut runtime = start.transit().unwrap();

        let winner = runtime.run();
        assert!(runtime.is_finished());
        let winner = winner.expect("a two-player game always has a survivor");
        assert!(winner == "BOT1" || winner == "BOT2");
    }

    #[test]
    fn test_bot_answers_the_awaited_input() {
        let mut start = StartPhase::new(vec!["BOT1".into(), "P2_B".into()]).unwrap();
        start.enter();
        start.settled("BOT1").unwrap();
        start.settled("P2_B").unwrap();
        let mut runtime = start.transit().unwrap();
        runtime.enter();

        let mut bot = Bot::with_seed(7);
        assert_eq!(runtime.awaiting(), Awaiting::DrawColor);
        assert!(bot.act(&mut runtime));
        // The draw has been answered and play moved past it.
        assert_ne!(runtime.awaiting(), Awaiting::DrawColor);
    }
}
