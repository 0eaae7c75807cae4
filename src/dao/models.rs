//! Entity definitions owned by the lobby store.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::machine::LobbyPhase;

/// Identifier of a lobby record.
pub type LobbyId = i64;
/// Identifier of a player record.
pub type PlayerId = i64;

/// Secret role assigned to a player at round start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Does not know the secret word; wins by guessing it or surviving the vote.
    Impostor,
    /// Knows the secret word; wins by ejecting an impostor.
    Innocent,
}

/// Per-round configuration owned by the lobby host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbySettings {
    /// Requested impostor count; clamped to half the roster at assignment time.
    pub num_impostors: u32,
    /// Word catalog category used when drawing the secret word.
    pub category: String,
    /// The secret word; empty until the host sets it or a round starts.
    pub word: String,
    /// The hint revealed to impostors when `give_hint` is set.
    pub hint: String,
    /// Whether impostors receive the hint instead of an empty word.
    pub give_hint: bool,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            num_impostors: 1,
            category: "General".to_string(),
            word: String::new(),
            hint: String::new(),
            give_hint: false,
        }
    }
}

/// A single game room identified by a short join code.
#[derive(Debug, Clone)]
pub struct Lobby {
    /// Unique, immutable identifier.
    pub id: LobbyId,
    /// 4-character uppercase join code, unique among stored lobbies.
    pub code: String,
    /// Opaque identifier of the creator; never serialized to clients.
    pub host_id: String,
    /// Current position in the lobby state machine.
    pub phase: LobbyPhase,
    /// Round configuration.
    pub settings: LobbySettings,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// A participant bound to exactly one lobby for its lifetime.
#[derive(Debug, Clone)]
pub struct Player {
    /// Unique identifier.
    pub id: PlayerId,
    /// Owning lobby.
    pub lobby_id: LobbyId,
    /// Display name, non-empty.
    pub name: String,
    /// Secret role; `None` until the first role assignment.
    pub role: Option<Role>,
    /// Exactly one host per lobby, fixed at creation.
    pub is_host: bool,
    /// Whether this player has voted in the current round.
    pub has_voted: bool,
    /// Vote target; `None` means skip. Meaningful only while `has_voted`.
    pub voted_for: Option<PlayerId>,
    /// The value revealed to this player: the secret word for innocents, the
    /// hint for impostors when hints are enabled, empty otherwise.
    pub word: String,
}

/// Shallow-merge update applied to a stored [`Lobby`].
#[derive(Debug, Clone, Default)]
pub struct LobbyPatch {
    /// New phase, when present.
    pub phase: Option<LobbyPhase>,
    /// Replacement settings, when present.
    pub settings: Option<LobbySettings>,
}

/// Shallow-merge update applied to a stored [`Player`].
#[derive(Debug, Clone, Default)]
pub struct PlayerPatch {
    /// New role, when present.
    pub role: Option<Option<Role>>,
    /// New voted flag, when present.
    pub has_voted: Option<bool>,
    /// New vote target, when present (inner `None` is a skip vote).
    pub voted_for: Option<Option<PlayerId>>,
    /// New revealed word, when present.
    pub word: Option<String>,
}

impl Lobby {
    /// Apply a shallow merge of `patch` onto this record.
    pub fn apply(&mut self, patch: LobbyPatch) {
        if let Some(phase) = patch.phase {
            self.phase = phase;
        }
        if let Some(settings) = patch.settings {
            self.settings = settings;
        }
    }
}

impl Player {
    /// Apply a shallow merge of `patch` onto this record.
    pub fn apply(&mut self, patch: PlayerPatch) {
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(has_voted) = patch.has_voted {
            self.has_voted = has_voted;
        }
        if let Some(voted_for) = patch.voted_for {
            self.voted_for = voted_for;
        }
        if let Some(word) = patch.word {
            self.word = word;
        }
    }
}
