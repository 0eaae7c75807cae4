//! HTTP route composition.

use axum::Router;

use crate::state::SharedState;

/// Swagger UI routes.
pub mod docs;
/// In-round game actions.
pub mod game;
/// Health check.
pub mod health;
/// Lobby lifecycle.
pub mod lobby;
/// WebSocket upgrade.
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = Router::new().nest("/api", lobby::router().merge(game::router()));

    let base_router = health::router().merge(websocket::router()).merge(api_router);

    let docs_router = docs::router(state.clone());

    base_router.merge(docs_router).with_state(state)
}
