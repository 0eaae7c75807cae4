//! Lobby lifecycle requests and the public/private projections of stored state.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{Lobby, LobbyId, LobbySettings, Player, PlayerId, Role},
    dto::{format_system_time, validation::validate_join_code},
    state::machine::LobbyPhase,
};

/// Payload used to create a fresh lobby; the caller becomes its host.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateLobbyRequest {
    /// Display name of the host player.
    #[validate(length(min = 1, max = 32, message = "player name must be 1-32 characters"))]
    pub player_name: String,
}

/// Payload used to join an existing lobby by its code.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinLobbyRequest {
    /// 4-letter join code; case-insensitive.
    #[validate(custom(function = "validate_join_code"))]
    pub code: String,
    /// Display name of the joining player.
    #[validate(length(min = 1, max = 32, message = "player name must be 1-32 characters"))]
    pub player_name: String,
}

/// Host-only partial merge into the lobby settings.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateSettingsRequest {
    /// Caller identifier; must be the lobby host.
    pub player_id: PlayerId,
    /// Requested impostor count.
    #[validate(range(min = 1, max = 10, message = "impostor count must be between 1 and 10"))]
    pub num_impostors: Option<u32>,
    /// Word catalog category for the next round.
    pub category: Option<String>,
    /// Explicit secret word; leave empty to draw from the catalog at start.
    pub word: Option<String>,
    /// Explicit hint shown to impostors when hints are enabled.
    pub hint: Option<String>,
    /// Whether impostors receive the hint.
    pub give_hint: Option<bool>,
}

impl UpdateSettingsRequest {
    /// Shallow-merge the provided fields onto `current`.
    pub fn merged_into(&self, current: &LobbySettings) -> LobbySettings {
        LobbySettings {
            num_impostors: self.num_impostors.unwrap_or(current.num_impostors),
            category: self.category.clone().unwrap_or_else(|| current.category.clone()),
            word: self.word.clone().unwrap_or_else(|| current.word.clone()),
            hint: self.hint.clone().unwrap_or_else(|| current.hint.clone()),
            give_hint: self.give_hint.unwrap_or(current.give_hint),
        }
    }
}

/// Public projection of the lobby settings.
///
/// The secret word and hint never appear here; they only reach players through
/// their own role assignment.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettingsSummary {
    /// Requested impostor count.
    pub num_impostors: u32,
    /// Word catalog category.
    pub category: String,
    /// Whether impostors receive the hint.
    pub give_hint: bool,
}

impl From<&LobbySettings> for SettingsSummary {
    fn from(settings: &LobbySettings) -> Self {
        Self {
            num_impostors: settings.num_impostors,
            category: settings.category.clone(),
            give_hint: settings.give_hint,
        }
    }
}

/// Public projection of a lobby exposed to REST and push clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LobbySummary {
    /// Lobby identifier.
    pub id: LobbyId,
    /// 4-letter join code.
    pub code: String,
    /// Current phase.
    pub phase: LobbyPhase,
    /// Public settings view.
    pub settings: SettingsSummary,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
}

impl From<&Lobby> for LobbySummary {
    fn from(lobby: &Lobby) -> Self {
        Self {
            id: lobby.id,
            code: lobby.code.clone(),
            phase: lobby.phase,
            settings: (&lobby.settings).into(),
            created_at: format_system_time(lobby.created_at),
        }
    }
}

/// Public projection of a player: no role, word, or vote target.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerSummary {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Whether this player is the lobby host.
    pub is_host: bool,
    /// Whether this player has voted in the current round.
    pub has_voted: bool,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            is_host: player.is_host,
            has_voted: player.has_voted,
        }
    }
}

/// Full projection of a player, only ever sent to that player.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrivatePlayer {
    /// Player identifier.
    pub id: PlayerId,
    /// Owning lobby.
    pub lobby_id: LobbyId,
    /// Display name.
    pub name: String,
    /// Whether this player is the lobby host.
    pub is_host: bool,
    /// Secret role; absent before the first role assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Word or hint revealed to this player.
    pub word: String,
    /// Whether this player has voted in the current round.
    pub has_voted: bool,
    /// Vote target; `null` means skip. Meaningful only while `has_voted`.
    pub voted_for: Option<PlayerId>,
}

impl From<&Player> for PrivatePlayer {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            lobby_id: player.lobby_id,
            name: player.name.clone(),
            is_host: player.is_host,
            role: player.role,
            word: player.word.clone(),
            has_voted: player.has_voted,
            voted_for: player.voted_for,
        }
    }
}

/// Response to lobby creation and join: the lobby plus the caller's own record.
#[derive(Debug, Serialize, ToSchema)]
pub struct LobbyJoinedResponse {
    /// Public lobby view.
    pub lobby: LobbySummary,
    /// The caller's own player record.
    pub player: PrivatePlayer,
}

/// Response to the state fetch: public roster plus the caller's own view.
#[derive(Debug, Serialize, ToSchema)]
pub struct LobbyStateResponse {
    /// Public lobby view.
    pub lobby: LobbySummary,
    /// Public roster.
    pub players: Vec<PlayerSummary>,
    /// The caller's own record, when a known `playerId` was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub me: Option<PrivatePlayer>,
}
