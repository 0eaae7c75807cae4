//! Explicit phase state machine for a lobby.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// High-level phases a lobby can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LobbyPhase {
    /// Players are gathering; the host may adjust settings.
    Waiting,
    /// Roles are assigned and the round is live.
    Playing,
    /// At least one vote of the current round has been cast.
    ///
    /// Presentation-only sub-state of a live round: votes are legal in both
    /// `Playing` and `Voting`, and tally evaluation is gated purely on every
    /// current player having voted.
    Voting,
    /// Terminal state; a winner has been broadcast.
    Finished,
}

/// Events that can be applied to a lobby's phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyEvent {
    /// Host starts the round from the waiting room.
    StartGame,
    /// First vote of a round flips the presentational voting flag.
    CallVote,
    /// Tally resolved to a skip; the round continues.
    SkipResolved,
    /// Tally ejected a single player; every ejection ends the round.
    PlayerEjected,
    /// An impostor guessed the secret word.
    WordGuessed,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the lobby was in when the invalid event was received.
    pub from: LobbyPhase,
    /// The event that cannot be applied from this phase.
    pub event: LobbyEvent,
}

/// Compute the phase following `event`, rejecting transitions the flow does
/// not allow. The lobby record in the store is the single owner of the current
/// phase, so this function is pure.
pub fn advance(from: LobbyPhase, event: LobbyEvent) -> Result<LobbyPhase, InvalidTransition> {
    let next = match (from, event) {
        (LobbyPhase::Waiting, LobbyEvent::StartGame) => LobbyPhase::Playing,
        (LobbyPhase::Playing, LobbyEvent::CallVote) => LobbyPhase::Voting,
        (LobbyPhase::Playing | LobbyPhase::Voting, LobbyEvent::WordGuessed) => LobbyPhase::Finished,
        (LobbyPhase::Voting, LobbyEvent::PlayerEjected) => LobbyPhase::Finished,
        (LobbyPhase::Voting, LobbyEvent::SkipResolved) => LobbyPhase::Playing,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}

impl LobbyPhase {
    /// Whether the round is live, i.e. votes and guesses are accepted.
    pub fn is_live(self) -> bool {
        matches!(self, LobbyPhase::Playing | LobbyPhase::Voting)
    }
}
