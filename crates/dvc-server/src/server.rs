//! WebSocket server and connection handling.
//!
//! Each game lives in a concurrent registry keyed by id. Mutating
//! calls take the game's entry exclusively for the duration of the
//! call, so inputs to the same game are serialized; view requests take
//! shared access. Connections subscribe to one seat of one game and
//! receive that player's view after every change.

use crate::game::GameSession;
use crate::protocol::{ClientMessage, ServerMessage};
use dashmap::DashMap;
use dvc_core::GameError;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// All live games
    pub games: DashMap<Uuid, GameSession>,
    /// Connection id -> (game id, seat) it subscribed to
    pub subscriptions: DashMap<Uuid, (Uuid, String)>,
    /// Connection id -> outgoing message sender
    pub senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            games: DashMap::new(),
            subscriptions: DashMap::new(),
            senders: DashMap::new(),
        }
    }

    /// Send a message to a specific connection.
    pub fn send_to(&self, connection_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&connection_id) {
            let _ = sender.send(msg);
        }
    }

    /// Push fresh per-seat views to every connection subscribed to a
    /// game, and the game-over notice once it has finished.
    pub fn broadcast_views(&self, game_id: Uuid) {
        let Some(game) = self.games.get(&game_id) else {
            return;
        };
        let finished = game.is_finished();
        let winner_id = game.winner_id().map(|id| id.to_string());

        for entry in self.subscriptions.iter() {
            let (subscribed_game, player_id) = entry.value();
            if *subscribed_game != game_id {
                continue;
            }
            if let Some(view) = game.view(player_id) {
                self.send_to(*entry.key(), ServerMessage::View { view });
            }
            if finished {
                self.send_to(
                    *entry.key(),
                    ServerMessage::GameOver {
                        game_id,
                        winner_id: winner_id.clone(),
                    },
                );
            }
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("DVC server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let connection_id = Uuid::new_v4();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.senders.insert(connection_id, tx);

    let welcome = ServerMessage::Welcome { connection_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text.into())).await?;

    // Forward messages from the channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) {
                    handle_message(connection_id, client_msg, &state);
                } else {
                    warn!("Invalid message from {}: {}", connection_id, text);
                    state.send_to(
                        connection_id,
                        ServerMessage::Error {
                            message: "malformed message".to_string(),
                        },
                    );
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", connection_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to(connection_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", connection_id, e);
                break;
            }
            _ => {}
        }
    }

    // Games persist after disconnect; the seat can be rejoined.
    state.subscriptions.remove(&connection_id);
    state.senders.remove(&connection_id);
    send_task.abort();

    info!("Connection closed for {}", connection_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(connection_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::StartGame { player_ids } => match GameSession::new(player_ids) {
            Ok(session) => {
                let game_id = session.id;
                state.games.insert(game_id, session);
                info!("Game {} created", game_id);
                state.send_to(connection_id, ServerMessage::GameStarted { game_id });
            }
            Err(e) => {
                state.send_to(
                    connection_id,
                    ServerMessage::Error {
                        message: e.to_string(),
                    },
                );
            }
        },

        ClientMessage::JoinGame { game_id, player_id } => {
            let Some(game) = state.games.get(&game_id) else {
                state.send_to(
                    connection_id,
                    ServerMessage::Error {
                        message: "game not found".to_string(),
                    },
                );
                return;
            };
            if !game.has_player(&player_id) {
                state.send_to(
                    connection_id,
                    ServerMessage::Error {
                        message: GameError::UnknownPlayer(player_id).to_string(),
                    },
                );
                return;
            }
            let view = game.view(&player_id);
            drop(game);

            state
                .subscriptions
                .insert(connection_id, (game_id, player_id));
            match view {
                Some(view) => {
                    state.send_to(connection_id, ServerMessage::Joined { game_id, view })
                }
                None => state.send_to(
                    connection_id,
                    ServerMessage::Error {
                        message: "game has no view yet".to_string(),
                    },
                ),
            }
        }

        ClientMessage::View { game_id, player_id } => {
            let view = state.games.get(&game_id).and_then(|g| g.view(&player_id));
            match view {
                Some(view) => state.send_to(connection_id, ServerMessage::View { view }),
                None => state.send_to(
                    connection_id,
                    ServerMessage::Error {
                        message: "game not found".to_string(),
                    },
                ),
            }
        }

        ClientMessage::ReorderHand {
            game_id,
            player_id,
            encoded,
        } => {
            apply(state, connection_id, game_id, player_id.clone(), |g| {
                g.reorder_hand(&player_id, &encoded)
            });
        }

        ClientMessage::Settled { game_id, player_id } => {
            apply(state, connection_id, game_id, player_id.clone(), |g| {
                g.settled(&player_id)
            });
        }

        ClientMessage::DrawColor {
            game_id,
            player_id,
            color,
        } => {
            apply(state, connection_id, game_id, player_id.clone(), |g| {
                g.draw_color(&player_id, color)
            });
        }

        ClientMessage::Guess {
            game_id,
            player_id,
            target_player_id,
            target_index,
            guess,
        } => {
            apply(state, connection_id, game_id, player_id.clone(), |g| {
                g.guess(&player_id, &target_player_id, target_index, guess)
            });
        }

        ClientMessage::RevealDecision {
            game_id,
            player_id,
            continue_guessing,
        } => {
            apply(state, connection_id, game_id, player_id.clone(), |g| {
                g.reveal_decision(&player_id, continue_guessing)
            });
        }

        ClientMessage::SelfReveal {
            game_id,
            player_id,
            own_index,
        } => {
            apply(state, connection_id, game_id, player_id.clone(), |g| {
                g.self_reveal(&player_id, own_index)
            });
        }

        ClientMessage::SettlePosition {
            game_id,
            player_id,
            insert_index,
        } => {
            apply(state, connection_id, game_id, player_id.clone(), |g| {
                g.settle_position(&player_id, insert_index)
            });
        }

        ClientMessage::SettleHand {
            game_id,
            player_id,
            encoded,
        } => {
            apply(state, connection_id, game_id, player_id.clone(), |g| {
                g.settle_hand(&player_id, &encoded)
            });
        }

        ClientMessage::Ping => {
            state.send_to(connection_id, ServerMessage::Pong);
        }
    }
}

/// Apply a mutating call under the game's exclusive registry entry,
/// answer the caller with the applied/rejected outcome, and push fresh
/// views to everyone on success.
fn apply<F>(state: &Arc<ServerState>, connection_id: Uuid, game_id: Uuid, player_id: String, f: F)
where
    F: FnOnce(&mut GameSession) -> Result<(), GameError>,
{
    let Some(mut game) = state.games.get_mut(&game_id) else {
        state.send_to(
            connection_id,
            ServerMessage::Error {
                message: "game not found".to_string(),
            },
        );
        return;
    };

    match f(&mut game) {
        Ok(()) => {
            let view = game.view(&player_id);
            drop(game); // release the entry before broadcasting
            state.send_to(
                connection_id,
                ServerMessage::Applied {
                    applied: true,
                    error: None,
                    view,
                },
            );
            state.broadcast_views(game_id);
        }
        Err(e) => {
            drop(game);
            state.send_to(
                connection_id,
                ServerMessage::Applied {
                    applied: false,
                    error: Some(e.to_string()),
                    view: None,
                },
            );
        }
    }
}
