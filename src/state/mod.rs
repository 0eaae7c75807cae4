//! Shared application state: repository handle, connection registry, and
//! per-lobby mutation gates.

/// Phase state machine for a lobby.
pub mod machine;
/// Role assignment for round start.
pub mod roles;
/// Vote tally evaluation.
pub mod tally;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{Mutex, mpsc};

use crate::{
    config::AppConfig,
    dao::{
        models::{LobbyId, PlayerId},
        store::LobbyStore,
    },
};

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

#[derive(Clone)]
/// Handle used to push serialized events to a connected player.
pub struct ClientConnection {
    /// Player this socket authenticated as.
    pub player_id: PlayerId,
    /// Writer-task channel feeding the player's WebSocket.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state storing the lobby repository, the word catalog,
/// and the registry of connected player sockets.
pub struct AppState {
    store: Arc<dyn LobbyStore>,
    config: AppConfig,
    clients: DashMap<PlayerId, ClientConnection>,
    gates: DashMap<LobbyId, Arc<Mutex<()>>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<dyn LobbyStore>, config: AppConfig) -> SharedState {
        Arc::new(Self {
            store,
            config,
            clients: DashMap::new(),
            gates: DashMap::new(),
        })
    }

    /// Handle to the lobby repository.
    pub fn store(&self) -> &Arc<dyn LobbyStore> {
        &self.store
    }

    /// The immutable word catalog.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry of active player sockets keyed by player id.
    pub fn clients(&self) -> &DashMap<PlayerId, ClientConnection> {
        &self.clients
    }

    /// Mutual-exclusion gate serializing state transitions of one lobby.
    ///
    /// Different lobbies mutate fully in parallel; within a lobby, every
    /// read-validate-mutate sequence must run under this gate so two
    /// near-simultaneous last votes cannot both trigger a tally.
    pub fn lobby_gate(&self, lobby_id: LobbyId) -> Arc<Mutex<()>> {
        self.gates
            .entry(lobby_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
