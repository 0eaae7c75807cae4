//! Requests and responses for in-round game actions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::models::PlayerId;

/// Host request to start the round and assign roles.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartGameRequest {
    /// Caller identifier; must be the lobby host.
    pub player_id: PlayerId,
}

/// One player's vote for a suspect, or a skip.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VoteRequest {
    /// Caller identifier; must belong to the lobby.
    pub player_id: PlayerId,
    /// Target player, or `null` to skip.
    pub target_id: Option<PlayerId>,
}

/// Acknowledgement of a recorded vote.
#[derive(Debug, Serialize, ToSchema)]
pub struct VoteResponse {
    /// Always `true`; resolution is pushed over the WebSocket channel.
    pub success: bool,
}

/// Impostor attempt at the secret word.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GuessRequest {
    /// Caller identifier; must hold the impostor role.
    pub player_id: PlayerId,
    /// Guessed word; compared case-insensitively with whitespace trimmed.
    #[validate(length(min = 1, message = "guess must not be empty"))]
    pub word: String,
}

/// Outcome of a word guess.
#[derive(Debug, Serialize, ToSchema)]
pub struct GuessResponse {
    /// Whether the guess matched the secret word.
    pub correct: bool,
    /// Whether the round ended as a result.
    pub game_over: bool,
}
