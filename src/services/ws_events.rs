//! Push-event construction and fan-out to connected players.
//!
//! Services build an [`Outbox`] while they hold a lobby gate and flush it
//! after the guard is dropped, so a slow or dead client can never block a
//! state transition. Delivery to an offline player is logged and ignored.

use axum::extract::ws::Message;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    dao::models::{Player, PlayerId},
    dto::ws::ServerEvent,
    state::SharedState,
};

/// Event name for roster or settings changes.
pub const EVENT_LOBBY_UPDATE: &str = "lobby_update";
/// Event name for the per-player role reveal at round start.
pub const EVENT_GAME_START: &str = "game_start";
/// Event name for a vote that did not yet resolve the round.
pub const EVENT_VOTE_UPDATE: &str = "vote_update";
/// Event name for a resolved tally or a correct guess.
pub const EVENT_GAME_OVER: &str = "game_over";
/// Event name for client-directed error notices.
pub const EVENT_ERROR: &str = "error";

/// Per-recipient events queued inside a critical section and delivered after it.
#[derive(Default)]
pub struct Outbox {
    deliveries: Vec<(PlayerId, ServerEvent)>,
}

impl Outbox {
    /// Create an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the same event for every player of `roster`.
    pub fn broadcast<T: Serialize>(&mut self, roster: &[Player], kind: &str, payload: &T) {
        match ServerEvent::json(kind, payload) {
            Ok(event) => {
                for player in roster {
                    self.deliveries.push((player.id, event.clone()));
                }
            }
            Err(err) => warn!(kind, error = %err, "failed to serialize broadcast payload"),
        }
    }

    /// Queue an event for a single player.
    pub fn direct<T: Serialize>(&mut self, player_id: PlayerId, kind: &str, payload: &T) {
        match ServerEvent::json(kind, payload) {
            Ok(event) => self.deliveries.push((player_id, event)),
            Err(err) => warn!(kind, error = %err, "failed to serialize direct payload"),
        }
    }

    /// Deliver all queued events over the connected sockets.
    ///
    /// Must be called after the lobby gate has been released.
    pub fn flush(self, state: &SharedState) {
        for (player_id, event) in self.deliveries {
            send_event(state, player_id, &event);
        }
    }
}

/// Serialize `event` and push it to the player's socket, if connected.
pub fn send_event(state: &SharedState, player_id: PlayerId, event: &ServerEvent) {
    let Some(connection) = state.clients().get(&player_id) else {
        debug!(player_id, kind = %event.kind, "player offline; dropping event");
        return;
    };

    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(player_id, error = %err, "failed to serialize event envelope");
            return;
        }
    };

    let tx = connection.tx.clone();
    drop(connection);

    if tx.send(Message::Text(payload.into())).is_err() {
        debug!(player_id, "writer closed; removing client connection");
        state.clients().remove(&player_id);
    }
}
