//! Lobby repository abstraction and its in-memory implementation.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::SystemTime;

use dashmap::DashMap;
use rand::Rng;

use crate::dao::models::{Lobby, LobbyId, LobbyPatch, LobbySettings, Player, PlayerId, PlayerPatch};
use crate::state::machine::LobbyPhase;

/// Length of the generated join code.
const CODE_LENGTH: usize = 4;

/// Storage contract for lobbies and players.
///
/// Implementations own entity storage exclusively; the engine never keeps
/// private copies and reads back current state before every decision. All
/// operations return immediately, so callers may hold a lobby gate across them.
pub trait LobbyStore: Send + Sync {
    /// Create a lobby with default settings plus its host player.
    fn create_lobby(&self, host_id: &str, host_name: &str) -> (Lobby, Player);
    /// Add a player to the lobby identified by `code`, if it exists.
    fn join_lobby(&self, code: &str, name: &str) -> Option<(Lobby, Player)>;
    /// Fetch a lobby by id.
    fn lobby(&self, id: LobbyId) -> Option<Lobby>;
    /// Fetch a lobby by its join code.
    fn lobby_by_code(&self, code: &str) -> Option<Lobby>;
    /// Shallow-merge `patch` into the lobby, returning the updated record.
    fn update_lobby(&self, id: LobbyId, patch: LobbyPatch) -> Option<Lobby>;
    /// List all players of a lobby, ordered by join order.
    fn players(&self, lobby_id: LobbyId) -> Vec<Player>;
    /// Fetch a player by id.
    fn player(&self, id: PlayerId) -> Option<Player>;
    /// Shallow-merge `patch` into the player, returning the updated record.
    fn update_player(&self, id: PlayerId, patch: PlayerPatch) -> Option<Player>;
    /// Remove a player (explicit leave/kick). Returns whether it existed.
    fn delete_player(&self, id: PlayerId) -> bool;
}

/// In-memory [`LobbyStore`] backed by concurrent maps and atomic id counters.
#[derive(Default)]
pub struct MemoryStore {
    lobbies: DashMap<LobbyId, Lobby>,
    players: DashMap<PlayerId, Player>,
    lobby_ids: AtomicI64,
    player_ids: AtomicI64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw join codes until one is unused among stored lobbies.
    ///
    /// Collisions are rare at realistic session counts but must never leak a
    /// duplicate code, since the code is the join key.
    fn generate_code(&self) -> String {
        loop {
            let mut rng = rand::rng();
            let code: String = (0..CODE_LENGTH)
                .map(|_| rng.random_range(b'A'..=b'Z') as char)
                .collect();
            if !self.lobbies.iter().any(|entry| entry.value().code == code) {
                return code;
            }
        }
    }

    fn insert_player(&self, lobby_id: LobbyId, name: &str, is_host: bool) -> Player {
        let id = self.player_ids.fetch_add(1, Ordering::Relaxed) + 1;
        let player = Player {
            id,
            lobby_id,
            name: name.to_string(),
            role: None,
            is_host,
            has_voted: false,
            voted_for: None,
            word: String::new(),
        };
        self.players.insert(id, player.clone());
        player
    }
}

impl LobbyStore for MemoryStore {
    fn create_lobby(&self, host_id: &str, host_name: &str) -> (Lobby, Player) {
        let id = self.lobby_ids.fetch_add(1, Ordering::Relaxed) + 1;
        let lobby = Lobby {
            id,
            code: self.generate_code(),
            host_id: host_id.to_string(),
            phase: LobbyPhase::Waiting,
            settings: LobbySettings::default(),
            created_at: SystemTime::now(),
        };
        self.lobbies.insert(id, lobby.clone());

        let player = self.insert_player(id, host_name, true);
        (lobby, player)
    }

    fn join_lobby(&self, code: &str, name: &str) -> Option<(Lobby, Player)> {
        let lobby = self.lobby_by_code(code)?;
        let player = self.insert_player(lobby.id, name, false);
        Some((lobby, player))
    }

    fn lobby(&self, id: LobbyId) -> Option<Lobby> {
        self.lobbies.get(&id).map(|entry| entry.value().clone())
    }

    fn lobby_by_code(&self, code: &str) -> Option<Lobby> {
        self.lobbies
            .iter()
            .find(|entry| entry.value().code == code)
            .map(|entry| entry.value().clone())
    }

    fn update_lobby(&self, id: LobbyId, patch: LobbyPatch) -> Option<Lobby> {
        let mut entry = self.lobbies.get_mut(&id)?;
        entry.value_mut().apply(patch);
        Some(entry.value().clone())
    }

    fn players(&self, lobby_id: LobbyId) -> Vec<Player> {
        let mut roster: Vec<Player> = self
            .players
            .iter()
            .filter(|entry| entry.value().lobby_id == lobby_id)
            .map(|entry| entry.value().clone())
            .collect();
        // Ids are monotonic, so this recovers join order.
        roster.sort_by_key(|player| player.id);
        roster
    }

    fn player(&self, id: PlayerId) -> Option<Player> {
        self.players.get(&id).map(|entry| entry.value().clone())
    }

    fn update_player(&self, id: PlayerId, patch: PlayerPatch) -> Option<Player> {
        let mut entry = self.players.get_mut(&id)?;
        entry.value_mut().apply(patch);
        Some(entry.value().clone())
    }

    fn delete_player(&self, id: PlayerId) -> bool {
        self.players.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::Role;

    #[test]
    fn create_lobby_generates_four_uppercase_letters() {
        let store = MemoryStore::new();
        let (lobby, host) = store.create_lobby("host-1", "Alice");

        assert_eq!(lobby.code.len(), 4);
        assert!(lobby.code.chars().all(|c| c.is_ascii_uppercase()));
        assert_eq!(lobby.phase, LobbyPhase::Waiting);
        assert!(host.is_host);
        assert_eq!(host.lobby_id, lobby.id);
    }

    #[test]
    fn code_resolves_to_exactly_one_lobby() {
        let store = MemoryStore::new();
        let mut codes = std::collections::HashSet::new();
        for i in 0..50 {
            let (lobby, _) = store.create_lobby(&format!("host-{i}"), "Host");
            assert!(codes.insert(lobby.code.clone()), "duplicate code issued");
            let found = store.lobby_by_code(&lobby.code).unwrap();
            assert_eq!(found.id, lobby.id);
        }
    }

    #[test]
    fn join_unknown_code_returns_none() {
        let store = MemoryStore::new();
        assert!(store.join_lobby("ZZZZ", "Bob").is_none());
    }

    #[test]
    fn players_are_listed_in_join_order() {
        let store = MemoryStore::new();
        let (lobby, host) = store.create_lobby("host-1", "Alice");
        let (_, p2) = store.join_lobby(&lobby.code, "Bob").unwrap();
        let (_, p3) = store.join_lobby(&lobby.code, "Carol").unwrap();

        let roster = store.players(lobby.id);
        let ids: Vec<_> = roster.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![host.id, p2.id, p3.id]);
    }

    #[test]
    fn update_player_merges_only_provided_fields() {
        let store = MemoryStore::new();
        let (lobby, host) = store.create_lobby("host-1", "Alice");

        let updated = store
            .update_player(
                host.id,
                PlayerPatch {
                    role: Some(Some(Role::Innocent)),
                    word: Some("Penguin".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.role, Some(Role::Innocent));
        assert_eq!(updated.word, "Penguin");
        assert_eq!(updated.name, "Alice");
        assert!(!updated.has_voted);
        assert_eq!(updated.lobby_id, lobby.id);
    }

    #[test]
    fn delete_player_removes_the_record() {
        let store = MemoryStore::new();
        let (lobby, _) = store.create_lobby("host-1", "Alice");
        let (_, p2) = store.join_lobby(&lobby.code, "Bob").unwrap();

        assert!(store.delete_player(p2.id));
        assert!(!store.delete_player(p2.id));
        assert_eq!(store.players(lobby.id).len(), 1);
    }
}
