//! WebSocket envelopes exchanged with player clients.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dao::models::{PlayerId, Role},
    dto::lobby::{LobbySummary, PlayerSummary, PrivatePlayer},
};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages accepted from player WebSocket clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Binds the socket to a player id; must be the first frame.
    Join {
        /// Player the socket authenticates as.
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    /// Any other message type; ignored.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Envelope pushed to connected players on every state mutation.
pub struct ServerEvent {
    /// Event name (`lobby_update`, `game_start`, `vote_update`, `game_over`, `error`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Event-specific payload.
    pub payload: serde_json::Value,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the envelope.
    pub fn json<T>(kind: &str, payload: &T) -> serde_json::Result<Self>
    where
        T: Serialize,
    {
        Ok(Self {
            kind: kind.to_string(),
            payload: serde_json::to_value(payload)?,
        })
    }
}

/// Why the round ended, or why it resolved without ending.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    /// A player was ejected by vote.
    Vote,
    /// An impostor guessed the secret word.
    Guess,
    /// The vote resolved to a skip; the round continues.
    Skip,
}

#[derive(Debug, Serialize, ToSchema)]
/// Payload for `lobby_update`: roster or settings changed.
pub struct LobbyUpdatePayload {
    /// Public lobby view.
    pub lobby: LobbySummary,
    /// Public roster.
    pub players: Vec<PlayerSummary>,
    /// Present only on the initial snapshot sent to an identifying socket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub me: Option<PrivatePlayer>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Payload for `game_start`, carrying the recipient's private role and word.
pub struct GameStartPayload {
    /// Public lobby view.
    pub lobby: LobbySummary,
    /// Public roster.
    pub players: Vec<PlayerSummary>,
    /// The recipient's own record including role and word.
    pub me: PrivatePlayer,
}

#[derive(Debug, Serialize, ToSchema)]
/// Payload for `vote_update`: someone voted but the round is not resolved.
pub struct VoteUpdatePayload {
    /// Public roster with refreshed voted flags.
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Payload for `game_over`: a tally resolved or the word was guessed.
pub struct GameOverPayload {
    /// Public lobby view.
    pub lobby: LobbySummary,
    /// Public roster.
    pub players: Vec<PlayerSummary>,
    /// Ejected player, when the tally produced one.
    pub ejected_id: Option<PlayerId>,
    /// Winning side; absent on a skip resolution.
    pub winner: Option<Role>,
    /// What resolved the round.
    pub reason: GameOverReason,
}

#[derive(Debug, Serialize, ToSchema)]
/// Payload for `error` events pushed to a single client.
pub struct ErrorPayload {
    /// Human-readable description.
    pub message: String,
}
