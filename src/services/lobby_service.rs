//! Lobby lifecycle operations: create, join, state fetch, settings update.

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{LobbyId, LobbyPatch, Player, PlayerId},
    dto::lobby::{
        LobbyJoinedResponse, LobbyStateResponse, LobbySummary, PrivatePlayer, UpdateSettingsRequest,
    },
    error::ServiceError,
    services::ws_events::{self, Outbox},
    state::{SharedState, machine::LobbyPhase},
};

/// Create a lobby and its host player.
pub async fn create_lobby(
    state: &SharedState,
    player_name: &str,
) -> Result<LobbyJoinedResponse, ServiceError> {
    let name = trimmed_name(player_name)?;

    let host_id = Uuid::new_v4().to_string();
    let (lobby, player) = state.store().create_lobby(&host_id, &name);
    info!(lobby_id = lobby.id, code = %lobby.code, "lobby created");

    Ok(LobbyJoinedResponse {
        lobby: (&lobby).into(),
        player: (&player).into(),
    })
}

/// Join an existing lobby by its code and notify the current roster.
pub async fn join_lobby(
    state: &SharedState,
    code: &str,
    player_name: &str,
) -> Result<LobbyJoinedResponse, ServiceError> {
    let name = trimmed_name(player_name)?;
    let code = code.trim().to_ascii_uppercase();

    let lobby = state
        .store()
        .lobby_by_code(&code)
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{code}` not found")))?;

    let gate = state.lobby_gate(lobby.id);
    let guard = gate.lock().await;

    // The roster is about to change, so re-read under the gate.
    let (lobby, player) = state
        .store()
        .join_lobby(&code, &name)
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{code}` not found")))?;
    let roster = state.store().players(lobby.id);
    let summary: LobbySummary = (&lobby).into();

    let mut outbox = Outbox::new();
    outbox.broadcast(
        &roster,
        ws_events::EVENT_LOBBY_UPDATE,
        &lobby_update_payload(&summary, &roster, None),
    );

    drop(guard);
    outbox.flush(state);
    info!(lobby_id = lobby.id, player_id = player.id, "player joined");

    Ok(LobbyJoinedResponse {
        lobby: summary,
        player: (&player).into(),
    })
}

/// Read-only snapshot of a lobby and its roster, addressed by join code.
///
/// Bypasses the lobby gate: each store read is individually consistent and
/// the response is advisory (clients converge through push events).
pub async fn get_state(
    state: &SharedState,
    code: &str,
    player_id: Option<PlayerId>,
) -> Result<LobbyStateResponse, ServiceError> {
    let code = code.trim().to_ascii_uppercase();
    let lobby = state
        .store()
        .lobby_by_code(&code)
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{code}` not found")))?;

    let roster = state.store().players(lobby.id);
    let me = player_id
        .and_then(|id| state.store().player(id))
        .filter(|player| player.lobby_id == lobby.id)
        .map(|player| PrivatePlayer::from(&player));

    Ok(LobbyStateResponse {
        lobby: (&lobby).into(),
        players: roster.iter().map(Into::into).collect(),
        me,
    })
}

/// Host-only partial merge into the lobby settings, allowed while waiting.
pub async fn update_settings(
    state: &SharedState,
    lobby_id: LobbyId,
    request: &UpdateSettingsRequest,
) -> Result<LobbySummary, ServiceError> {
    let gate = state.lobby_gate(lobby_id);
    let guard = gate.lock().await;

    let lobby = state
        .store()
        .lobby(lobby_id)
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{lobby_id}` not found")))?;

    let caller = state
        .store()
        .player(request.player_id)
        .ok_or_else(|| ServiceError::NotFound(format!("player `{}` not found", request.player_id)))?;
    if caller.lobby_id != lobby.id || !caller.is_host {
        return Err(ServiceError::Forbidden(
            "only the lobby host may change settings".into(),
        ));
    }

    if lobby.phase != LobbyPhase::Waiting {
        return Err(ServiceError::InvalidState(
            "settings can only be changed while waiting for players".into(),
        ));
    }

    let merged = request.merged_into(&lobby.settings);
    let lobby = state
        .store()
        .update_lobby(
            lobby_id,
            LobbyPatch {
                settings: Some(merged),
                ..Default::default()
            },
        )
        .ok_or_else(|| ServiceError::Internal(format!("lobby `{lobby_id}` vanished mid-update")))?;

    let roster = state.store().players(lobby_id);
    let summary: LobbySummary = (&lobby).into();

    let mut outbox = Outbox::new();
    outbox.broadcast(
        &roster,
        ws_events::EVENT_LOBBY_UPDATE,
        &lobby_update_payload(&summary, &roster, None),
    );

    drop(guard);
    outbox.flush(state);
    info!(lobby_id, "settings updated");

    Ok(summary)
}

/// Remove a player from a waiting lobby: self-leave, or a host kick.
pub async fn leave_lobby(
    state: &SharedState,
    lobby_id: LobbyId,
    caller_id: PlayerId,
    target_id: PlayerId,
) -> Result<(), ServiceError> {
    let gate = state.lobby_gate(lobby_id);
    let guard = gate.lock().await;

    let lobby = state
        .store()
        .lobby(lobby_id)
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{lobby_id}` not found")))?;

    let caller = state
        .store()
        .player(caller_id)
        .ok_or_else(|| ServiceError::NotFound(format!("player `{caller_id}` not found")))?;
    let target = state
        .store()
        .player(target_id)
        .ok_or_else(|| ServiceError::NotFound(format!("player `{target_id}` not found")))?;

    if caller.lobby_id != lobby.id || target.lobby_id != lobby.id {
        return Err(ServiceError::Forbidden(
            "player does not belong to this lobby".into(),
        ));
    }
    if caller_id != target_id && !caller.is_host {
        return Err(ServiceError::Forbidden(
            "only the lobby host may remove other players".into(),
        ));
    }
    if target.is_host {
        return Err(ServiceError::InvalidInput(
            "the host cannot leave their own lobby".into(),
        ));
    }
    // Mid-round departures would corrupt vote completeness.
    if lobby.phase != LobbyPhase::Waiting {
        return Err(ServiceError::InvalidState(
            "players can only leave while waiting for the round to start".into(),
        ));
    }

    state.store().delete_player(target_id);
    state.clients().remove(&target_id);

    let roster = state.store().players(lobby_id);
    let summary: LobbySummary = (&lobby).into();

    let mut outbox = Outbox::new();
    outbox.broadcast(
        &roster,
        ws_events::EVENT_LOBBY_UPDATE,
        &lobby_update_payload(&summary, &roster, None),
    );

    drop(guard);
    outbox.flush(state);
    info!(lobby_id, player_id = target_id, "player left");

    Ok(())
}

fn trimmed_name(name: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "player name must not be empty".into(),
        ));
    }
    Ok(name.to_string())
}

/// Build the shared `lobby_update` payload from a roster snapshot.
pub fn lobby_update_payload(
    lobby: &LobbySummary,
    roster: &[Player],
    me: Option<PrivatePlayer>,
) -> crate::dto::ws::LobbyUpdatePayload {
    crate::dto::ws::LobbyUpdatePayload {
        lobby: lobby.clone(),
        players: roster.iter().map(Into::into).collect(),
        me,
    }
}
