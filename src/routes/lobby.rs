//! Lobby lifecycle endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    dao::models::{LobbyId, PlayerId},
    dto::lobby::{
        CreateLobbyRequest, JoinLobbyRequest, LobbyJoinedResponse, LobbyStateResponse,
        LobbySummary, UpdateSettingsRequest,
    },
    error::AppError,
    services::lobby_service,
    state::SharedState,
};

/// Routes handling lobby creation, joining, state fetch, and settings.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/lobbies", post(create_lobby))
        .route("/lobbies/join", post(join_lobby))
        .route("/lobbies/{code}/state", get(lobby_state))
        .route("/lobbies/{id}/settings", put(update_settings))
        .route("/lobbies/{id}/players/{player_id}", delete(remove_player))
}

/// Query parameters identifying the caller of a player removal.
#[derive(Debug, Deserialize, IntoParams)]
pub struct RemovePlayerQuery {
    /// Player performing the removal; themselves, or the lobby host.
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
}

/// Query parameters accepted by the state fetch.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StateQuery {
    /// Player requesting the state; unlocks the private `me` view.
    #[serde(rename = "playerId")]
    pub player_id: Option<PlayerId>,
}

/// Create a fresh lobby; the caller becomes its host.
#[utoipa::path(
    post,
    path = "/api/lobbies",
    tag = "lobby",
    request_body = CreateLobbyRequest,
    responses(
        (status = 201, description = "Lobby created", body = LobbyJoinedResponse),
        (status = 400, description = "Invalid player name")
    )
)]
pub async fn create_lobby(
    State(state): State<SharedState>,
    Json(payload): Json<CreateLobbyRequest>,
) -> Result<(StatusCode, Json<LobbyJoinedResponse>), AppError> {
    payload.validate()?;
    let response = lobby_service::create_lobby(&state, &payload.player_name).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Join an existing lobby by its 4-letter code.
#[utoipa::path(
    post,
    path = "/api/lobbies/join",
    tag = "lobby",
    request_body = JoinLobbyRequest,
    responses(
        (status = 200, description = "Joined the lobby", body = LobbyJoinedResponse),
        (status = 404, description = "Unknown join code")
    )
)]
pub async fn join_lobby(
    State(state): State<SharedState>,
    Json(payload): Json<JoinLobbyRequest>,
) -> Result<Json<LobbyJoinedResponse>, AppError> {
    payload.validate()?;
    let response = lobby_service::join_lobby(&state, &payload.code, &payload.player_name).await?;
    Ok(Json(response))
}

/// Fetch the public lobby state, plus the caller's private view when known.
#[utoipa::path(
    get,
    path = "/api/lobbies/{code}/state",
    tag = "lobby",
    params(
        ("code" = String, Path, description = "4-letter join code"),
        StateQuery
    ),
    responses(
        (status = 200, description = "Current lobby state", body = LobbyStateResponse),
        (status = 404, description = "Unknown join code")
    )
)]
pub async fn lobby_state(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Query(query): Query<StateQuery>,
) -> Result<Json<LobbyStateResponse>, AppError> {
    let response = lobby_service::get_state(&state, &code, query.player_id).await?;
    Ok(Json(response))
}

/// Merge partial settings into the lobby; host-only, waiting phase only.
#[utoipa::path(
    put,
    path = "/api/lobbies/{id}/settings",
    tag = "lobby",
    params(("id" = i64, Path, description = "Lobby identifier")),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Merged settings", body = LobbySummary),
        (status = 403, description = "Caller is not the host"),
        (status = 404, description = "Unknown lobby")
    )
)]
pub async fn update_settings(
    State(state): State<SharedState>,
    Path(id): Path<LobbyId>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<LobbySummary>, AppError> {
    payload.validate()?;
    let summary = lobby_service::update_settings(&state, id, &payload).await?;
    Ok(Json(summary))
}

/// Remove a player from a waiting lobby; self-leave, or a kick by the host.
#[utoipa::path(
    delete,
    path = "/api/lobbies/{id}/players/{player_id}",
    tag = "lobby",
    params(
        ("id" = i64, Path, description = "Lobby identifier"),
        ("player_id" = i64, Path, description = "Player to remove"),
        RemovePlayerQuery
    ),
    responses(
        (status = 204, description = "Player removed"),
        (status = 403, description = "Caller may not remove this player"),
        (status = 404, description = "Unknown lobby or player")
    )
)]
pub async fn remove_player(
    State(state): State<SharedState>,
    Path((id, player_id)): Path<(LobbyId, PlayerId)>,
    Query(query): Query<RemovePlayerQuery>,
) -> Result<StatusCode, AppError> {
    lobby_service::leave_lobby(&state, id, query.player_id, player_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
