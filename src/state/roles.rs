//! Role assignment run once per round start.

use rand::seq::SliceRandom;

use crate::dao::models::{LobbySettings, Player, PlayerId, Role};

/// Role and revealed word computed for one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    /// Player receiving the assignment.
    pub player_id: PlayerId,
    /// Secret role for this round.
    pub role: Role,
    /// Value revealed to the player: the secret word for innocents, the hint
    /// for impostors when hints are enabled, empty otherwise.
    pub word: String,
}

/// Shuffle the roster uniformly and split it into impostors and innocents.
///
/// The impostor count is the configured number clamped to half the roster so
/// impostors never start as a majority.
pub fn assign_roles(roster: &[Player], settings: &LobbySettings) -> Vec<RoleAssignment> {
    let mut ids: Vec<PlayerId> = roster.iter().map(|player| player.id).collect();
    ids.shuffle(&mut rand::rng());

    let impostor_count = (settings.num_impostors as usize).min(ids.len() / 2);
    let impostor_word = if settings.give_hint {
        settings.hint.clone()
    } else {
        String::new()
    };

    ids.into_iter()
        .enumerate()
        .map(|(index, player_id)| {
            if index < impostor_count {
                RoleAssignment {
                    player_id,
                    role: Role::Impostor,
                    word: impostor_word.clone(),
                }
            } else {
                RoleAssignment {
                    player_id,
                    role: Role::Innocent,
                    word: settings.word.clone(),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: usize) -> Vec<Player> {
        (1..=n as PlayerId)
            .map(|id| Player {
                id,
                lobby_id: 1,
                name: format!("P{id}"),
                role: None,
                is_host: id == 1,
                has_voted: false,
                voted_for: None,
                word: String::new(),
            })
            .collect()
    }

    fn settings(num_impostors: u32, give_hint: bool) -> LobbySettings {
        LobbySettings {
            num_impostors,
            category: "Animals".to_string(),
            word: "Penguin".to_string(),
            hint: "Antarctic bird".to_string(),
            give_hint,
        }
    }

    #[test]
    fn assignment_partitions_the_roster() {
        let roster = roster(5);
        let assignments = assign_roles(&roster, &settings(1, false));

        assert_eq!(assignments.len(), 5);
        let mut seen: Vec<_> = assignments.iter().map(|a| a.player_id).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn impostor_count_is_clamped_to_half_the_roster() {
        let roster = roster(5);
        let assignments = assign_roles(&roster, &settings(4, false));

        let impostors = assignments
            .iter()
            .filter(|a| a.role == Role::Impostor)
            .count();
        assert_eq!(impostors, 2);
    }

    #[test]
    fn exactly_the_configured_impostors_below_the_clamp() {
        let roster = roster(6);
        let assignments = assign_roles(&roster, &settings(2, false));

        let impostors = assignments
            .iter()
            .filter(|a| a.role == Role::Impostor)
            .count();
        assert_eq!(impostors, 2);
    }

    #[test]
    fn innocents_see_the_word_and_impostors_the_hint() {
        let roster = roster(3);
        let assignments = assign_roles(&roster, &settings(1, true));

        for assignment in assignments {
            match assignment.role {
                Role::Innocent => assert_eq!(assignment.word, "Penguin"),
                Role::Impostor => assert_eq!(assignment.word, "Antarctic bird"),
            }
        }
    }

    #[test]
    fn impostors_get_an_empty_word_without_hints() {
        let roster = roster(3);
        let assignments = assign_roles(&roster, &settings(1, false));

        let impostor = assignments
            .iter()
            .find(|a| a.role == Role::Impostor)
            .unwrap();
        assert!(impostor.word.is_empty());
    }
}
