//! Session engine operations: round start, vote collection and tally, word guess.
//!
//! Every operation acquires the lobby's gate for its whole
//! read-validate-mutate-snapshot sequence and queues push events into an
//! [`Outbox`] that is flushed only after the guard is dropped.

use tracing::{error, info};

use crate::{
    dao::models::{Lobby, LobbyId, LobbyPatch, Player, PlayerId, PlayerPatch, Role},
    dto::{
        game::{GuessResponse, VoteResponse},
        lobby::{LobbySummary, PlayerSummary, PrivatePlayer},
        ws::{GameOverPayload, GameOverReason, GameStartPayload, VoteUpdatePayload},
    },
    error::ServiceError,
    services::ws_events::{self, Outbox},
    state::{
        SharedState,
        machine::{self, LobbyEvent, LobbyPhase},
        roles::assign_roles,
        tally::{TallyOutcome, tally},
    },
};

/// Minimum roster size for a meaningful vote.
const MIN_PLAYERS: usize = 3;

/// Start the round: assign roles, reveal words, and move to `playing`.
pub async fn start_game(
    state: &SharedState,
    lobby_id: LobbyId,
    caller_id: PlayerId,
) -> Result<LobbySummary, ServiceError> {
    let gate = state.lobby_gate(lobby_id);
    let guard = gate.lock().await;

    let lobby = require_lobby(state, lobby_id)?;
    let caller = require_player(state, caller_id)?;
    if caller.lobby_id != lobby.id || !caller.is_host {
        return Err(ServiceError::Forbidden(
            "only the lobby host may start the game".into(),
        ));
    }

    let roster = state.store().players(lobby_id);
    if roster.len() < MIN_PLAYERS {
        return Err(ServiceError::InsufficientPlayers {
            have: roster.len(),
            need: MIN_PLAYERS,
        });
    }

    let next_phase = machine::advance(lobby.phase, LobbyEvent::StartGame)?;

    // Draw the secret word from the catalog when the host did not set one.
    let mut settings = lobby.settings.clone();
    if settings.word.trim().is_empty() {
        let category = if state.config().has_category(&settings.category) {
            settings.category.clone()
        } else {
            state.config().random_category()
        };
        let entry = state.config().supply_word(&category);
        settings.category = category;
        settings.word = entry.word;
        settings.hint = entry.hint;
    }

    for assignment in assign_roles(&roster, &settings) {
        state
            .store()
            .update_player(
                assignment.player_id,
                PlayerPatch {
                    role: Some(Some(assignment.role)),
                    word: Some(assignment.word),
                    has_voted: Some(false),
                    voted_for: Some(None),
                },
            )
            .ok_or_else(|| internal_missing_player(lobby_id, assignment.player_id))?;
    }

    let lobby = state
        .store()
        .update_lobby(
            lobby_id,
            LobbyPatch {
                phase: Some(next_phase),
                settings: Some(settings),
            },
        )
        .ok_or_else(|| ServiceError::Internal(format!("lobby `{lobby_id}` vanished mid-start")))?;

    let roster = state.store().players(lobby_id);
    let summary: LobbySummary = (&lobby).into();
    let players: Vec<PlayerSummary> = roster.iter().map(Into::into).collect();

    // Each player only ever sees their own role and word.
    let mut outbox = Outbox::new();
    for player in &roster {
        outbox.direct(
            player.id,
            ws_events::EVENT_GAME_START,
            &GameStartPayload {
                lobby: summary.clone(),
                players: players.clone(),
                me: PrivatePlayer::from(player),
            },
        );
    }

    drop(guard);
    outbox.flush(state);
    info!(lobby_id, players = roster.len(), "game started");

    Ok(summary)
}

/// Record one player's vote; when the roster is complete, run the tally and
/// either finish the round or reset it for another vote.
pub async fn vote(
    state: &SharedState,
    lobby_id: LobbyId,
    caller_id: PlayerId,
    target_id: Option<PlayerId>,
) -> Result<VoteResponse, ServiceError> {
    let gate = state.lobby_gate(lobby_id);
    let guard = gate.lock().await;

    let lobby = require_lobby(state, lobby_id)?;
    let caller = require_player(state, caller_id)?;
    if caller.lobby_id != lobby_id {
        return Err(ServiceError::Forbidden(
            "player does not belong to this lobby".into(),
        ));
    }
    if !lobby.phase.is_live() {
        return Err(ServiceError::InvalidState(
            "votes are only accepted during a live round".into(),
        ));
    }
    if let Some(target) = target_id {
        let known = state
            .store()
            .player(target)
            .is_some_and(|player| player.lobby_id == lobby_id);
        if !known {
            return Err(ServiceError::InvalidInput(format!(
                "vote target `{target}` is not in this lobby"
            )));
        }
    }
    if caller.has_voted {
        return Err(ServiceError::AlreadyVoted);
    }

    state
        .store()
        .update_player(
            caller_id,
            PlayerPatch {
                has_voted: Some(true),
                voted_for: Some(target_id),
                ..Default::default()
            },
        )
        .ok_or_else(|| internal_missing_player(lobby_id, caller_id))?;

    // First vote of the round flips the presentational voting flag.
    let lobby = if lobby.phase == LobbyPhase::Playing {
        advance_lobby(state, &lobby, LobbyEvent::CallVote)?
    } else {
        lobby
    };

    let roster = state.store().players(lobby_id);
    let mut outbox = Outbox::new();

    if roster.iter().all(|player| player.has_voted) {
        resolve_round(state, &lobby, &roster, &mut outbox)?;
    } else {
        outbox.broadcast(
            &roster,
            ws_events::EVENT_VOTE_UPDATE,
            &VoteUpdatePayload {
                players: roster.iter().map(Into::into).collect(),
            },
        );
    }

    drop(guard);
    outbox.flush(state);

    Ok(VoteResponse { success: true })
}

/// Let an impostor guess the secret word; a correct guess ends the round.
pub async fn guess_word(
    state: &SharedState,
    lobby_id: LobbyId,
    caller_id: PlayerId,
    word: &str,
) -> Result<GuessResponse, ServiceError> {
    let gate = state.lobby_gate(lobby_id);
    let guard = gate.lock().await;

    let lobby = require_lobby(state, lobby_id)?;
    let caller = require_player(state, caller_id)?;
    if caller.lobby_id != lobby_id || caller.role != Some(Role::Impostor) {
        return Err(ServiceError::Forbidden(
            "only an impostor of this lobby may guess the word".into(),
        ));
    }
    if !lobby.phase.is_live() {
        return Err(ServiceError::InvalidState(
            "guesses are only accepted during a live round".into(),
        ));
    }

    let correct = normalize(word) == normalize(&lobby.settings.word);
    if !correct {
        // A wrong guess carries no penalty and mutates nothing.
        drop(guard);
        return Ok(GuessResponse {
            correct: false,
            game_over: false,
        });
    }

    let lobby = advance_lobby(state, &lobby, LobbyEvent::WordGuessed)?;
    let roster = state.store().players(lobby_id);

    let mut outbox = Outbox::new();
    outbox.broadcast(
        &roster,
        ws_events::EVENT_GAME_OVER,
        &GameOverPayload {
            lobby: (&lobby).into(),
            players: roster.iter().map(Into::into).collect(),
            ejected_id: None,
            winner: Some(Role::Impostor),
            reason: GameOverReason::Guess,
        },
    );

    drop(guard);
    outbox.flush(state);
    info!(lobby_id, player_id = caller_id, "impostor guessed the word");

    Ok(GuessResponse {
        correct: true,
        game_over: true,
    })
}

/// Tally a completed round and apply the resulting transition.
///
/// Must be called with the lobby gate held.
fn resolve_round(
    state: &SharedState,
    lobby: &Lobby,
    roster: &[Player],
    outbox: &mut Outbox,
) -> Result<(), ServiceError> {
    let votes: Vec<Option<PlayerId>> = roster.iter().map(|player| player.voted_for).collect();

    match tally(&votes) {
        TallyOutcome::Eject(target) => {
            let ejected = roster
                .iter()
                .find(|player| player.id == target)
                .ok_or_else(|| internal_missing_player(lobby.id, target))?;
            // Every ejection ends the round: ejecting an impostor hands the
            // win to the innocents, anything else hands it to the impostors.
            let winner = if ejected.role == Some(Role::Impostor) {
                Role::Innocent
            } else {
                Role::Impostor
            };

            let lobby = advance_lobby(state, lobby, LobbyEvent::PlayerEjected)?;
            info!(
                lobby_id = lobby.id,
                ejected_id = target,
                winner = ?winner,
                "vote ejected a player"
            );

            outbox.broadcast(
                roster,
                ws_events::EVENT_GAME_OVER,
                &GameOverPayload {
                    lobby: (&lobby).into(),
                    players: roster.iter().map(Into::into).collect(),
                    ejected_id: Some(target),
                    winner: Some(winner),
                    reason: GameOverReason::Vote,
                },
            );
        }
        TallyOutcome::Skip(reason) => {
            for player in roster {
                state
                    .store()
                    .update_player(
                        player.id,
                        PlayerPatch {
                            has_voted: Some(false),
                            voted_for: Some(None),
                            ..Default::default()
                        },
                    )
                    .ok_or_else(|| internal_missing_player(lobby.id, player.id))?;
            }

            let lobby = advance_lobby(state, lobby, LobbyEvent::SkipResolved)?;
            let roster = state.store().players(lobby.id);
            info!(lobby_id = lobby.id, reason = ?reason, "vote resolved to a skip");

            outbox.broadcast(
                &roster,
                ws_events::EVENT_GAME_OVER,
                &GameOverPayload {
                    lobby: (&lobby).into(),
                    players: roster.iter().map(Into::into).collect(),
                    ejected_id: None,
                    winner: None,
                    reason: GameOverReason::Skip,
                },
            );
        }
    }

    Ok(())
}

fn advance_lobby(
    state: &SharedState,
    lobby: &Lobby,
    event: LobbyEvent,
) -> Result<Lobby, ServiceError> {
    let next = machine::advance(lobby.phase, event)?;
    state
        .store()
        .update_lobby(
            lobby.id,
            LobbyPatch {
                phase: Some(next),
                ..Default::default()
            },
        )
        .ok_or_else(|| {
            ServiceError::Internal(format!("lobby `{}` vanished mid-transition", lobby.id))
        })
}

fn require_lobby(state: &SharedState, lobby_id: LobbyId) -> Result<Lobby, ServiceError> {
    state
        .store()
        .lobby(lobby_id)
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{lobby_id}` not found")))
}

fn require_player(state: &SharedState, player_id: PlayerId) -> Result<Player, ServiceError> {
    state
        .store()
        .player(player_id)
        .ok_or_else(|| ServiceError::NotFound(format!("player `{player_id}` not found")))
}

fn internal_missing_player(lobby_id: LobbyId, player_id: PlayerId) -> ServiceError {
    error!(lobby_id, player_id, "player record missing for a live lobby");
    ServiceError::Internal(format!(
        "player `{player_id}` missing while mutating lobby `{lobby_id}`"
    ))
}

/// Case-insensitive, whitespace-trimmed comparison key for word guesses.
fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}
