//! In-round game action endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use validator::Validate;

use crate::{
    dao::models::LobbyId,
    dto::{
        game::{GuessRequest, GuessResponse, StartGameRequest, VoteRequest, VoteResponse},
        lobby::LobbySummary,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling round start, voting, and word guesses.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/lobbies/{id}/start", post(start_game))
        .route("/lobbies/{id}/vote", post(vote))
        .route("/lobbies/{id}/guess", post(guess_word))
}

/// Start the round: assign roles and reveal each player's word.
#[utoipa::path(
    post,
    path = "/api/lobbies/{id}/start",
    tag = "game",
    params(("id" = i64, Path, description = "Lobby identifier")),
    request_body = StartGameRequest,
    responses(
        (status = 200, description = "Round started", body = LobbySummary),
        (status = 400, description = "Not enough players"),
        (status = 403, description = "Caller is not the host"),
        (status = 404, description = "Unknown lobby")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<LobbyId>,
    Json(payload): Json<StartGameRequest>,
) -> Result<Json<LobbySummary>, AppError> {
    let summary = game_service::start_game(&state, id, payload.player_id).await?;
    Ok(Json(summary))
}

/// Record a vote for a suspect, or a skip.
#[utoipa::path(
    post,
    path = "/api/lobbies/{id}/vote",
    tag = "game",
    params(("id" = i64, Path, description = "Lobby identifier")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = VoteResponse),
        (status = 403, description = "Caller is not in this lobby"),
        (status = 409, description = "Caller already voted this round")
    )
)]
pub async fn vote(
    State(state): State<SharedState>,
    Path(id): Path<LobbyId>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, AppError> {
    let response = game_service::vote(&state, id, payload.player_id, payload.target_id).await?;
    Ok(Json(response))
}

/// Submit an impostor's guess at the secret word.
#[utoipa::path(
    post,
    path = "/api/lobbies/{id}/guess",
    tag = "game",
    params(("id" = i64, Path, description = "Lobby identifier")),
    request_body = GuessRequest,
    responses(
        (status = 200, description = "Guess evaluated", body = GuessResponse),
        (status = 403, description = "Caller is not an impostor of this lobby")
    )
)]
pub async fn guess_word(
    State(state): State<SharedState>,
    Path(id): Path<LobbyId>,
    Json(payload): Json<GuessRequest>,
) -> Result<Json<GuessResponse>, AppError> {
    payload.validate()?;
    let response = game_service::guess_word(&state, id, payload.player_id, &payload.word).await?;
    Ok(Json(response))
}
