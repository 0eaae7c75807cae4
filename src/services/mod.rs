//! Service layer orchestrating the session engine and its collaborators.

/// OpenAPI documentation generation.
pub mod documentation;
/// Session engine: role assignment, voting, tally, and guesses.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Lobby lifecycle: create, join, state fetch, settings.
pub mod lobby_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
/// Push-event construction and fan-out.
pub mod ws_events;
