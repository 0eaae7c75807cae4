//! OpenAPI documentation generation.

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the word impostor backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::lobby::create_lobby,
        crate::routes::lobby::join_lobby,
        crate::routes::lobby::lobby_state,
        crate::routes::lobby::update_settings,
        crate::routes::lobby::remove_player,
        crate::routes::game::start_game,
        crate::routes::game::vote,
        crate::routes::game::guess_word,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::lobby::CreateLobbyRequest,
            crate::dto::lobby::JoinLobbyRequest,
            crate::dto::lobby::UpdateSettingsRequest,
            crate::dto::lobby::LobbyJoinedResponse,
            crate::dto::lobby::LobbyStateResponse,
            crate::dto::lobby::LobbySummary,
            crate::dto::lobby::PlayerSummary,
            crate::dto::lobby::PrivatePlayer,
            crate::dto::game::StartGameRequest,
            crate::dto::game::VoteRequest,
            crate::dto::game::VoteResponse,
            crate::dto::game::GuessRequest,
            crate::dto::game::GuessResponse,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "lobby", description = "Lobby creation, joining, and settings"),
        (name = "game", description = "Round start, voting, and word guesses"),
        (name = "ws", description = "WebSocket push channel for players"),
    )
)]
pub struct ApiDoc;
