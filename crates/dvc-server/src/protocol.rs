//! WebSocket protocol messages for DVC multiplayer.

use dvc_core::{Color, GameView, Guess};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Create a game with the given seat order. Ids starting with
    /// "BOT" are seated as bots.
    StartGame { player_ids: Vec<String> },

    /// Bind this connection to a seat in a game, to receive that
    /// player's view on every change.
    JoinGame { game_id: Uuid, player_id: String },

    /// Rearrange a hand during the start phase (token encoding)
    ReorderHand {
        game_id: Uuid,
        player_id: String,
        encoded: String,
    },

    /// Mark a player as done arranging; the game begins once everyone
    /// has settled
    Settled { game_id: Uuid, player_id: String },

    /// Answer a DRAW_COLOR prompt
    DrawColor {
        game_id: Uuid,
        player_id: String,
        color: Color,
    },

    /// Answer a GUESS_SELECTION prompt
    Guess {
        game_id: Uuid,
        player_id: String,
        target_player_id: String,
        target_index: usize,
        guess: Guess,
    },

    /// Answer a REVEAL_DECISION prompt
    RevealDecision {
        game_id: Uuid,
        player_id: String,
        continue_guessing: bool,
    },

    /// Answer a SELF_REVEAL_CHOICE prompt
    SelfReveal {
        game_id: Uuid,
        player_id: String,
        own_index: usize,
    },

    /// Answer a SETTLE_POSITION prompt with an insert position
    SettlePosition {
        game_id: Uuid,
        player_id: String,
        insert_index: Option<usize>,
    },

    /// Answer a SETTLE_POSITION prompt with a full hand encoding
    SettleHand {
        game_id: Uuid,
        player_id: String,
        encoded: String,
    },

    /// Request a fresh view
    View { game_id: Uuid, player_id: String },

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with the connection id
    Welcome { connection_id: Uuid },

    /// Game created successfully
    GameStarted { game_id: Uuid },

    /// Joined a game; carries the initial view
    Joined { game_id: Uuid, view: GameView },

    /// Outcome of a mutating call. Rejections come back with
    /// `applied: false` and the reason; the game is untouched.
    Applied {
        applied: bool,
        error: Option<String>,
        view: Option<GameView>,
    },

    /// Pushed view update after the game changed
    View { view: GameView },

    /// Game finished. `winner_id` is absent only if no seat survived.
    GameOver {
        game_id: Uuid,
        winner_id: Option<String>,
    },

    /// Request-level error (unknown game, malformed message)
    Error { message: String },

    /// Pong response
    Pong,
}
