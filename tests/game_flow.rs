//! End-to-end scenarios for the lobby session engine.

use std::sync::Arc;

use axum::extract::ws::Message;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use word_impostor_back::{
    config::AppConfig,
    dao::models::{PlayerId, Role},
    dao::store::MemoryStore,
    dto::lobby::{LobbyJoinedResponse, UpdateSettingsRequest},
    error::ServiceError,
    services::{game_service, lobby_service},
    state::{AppState, ClientConnection, SharedState, machine::LobbyPhase},
};

fn test_state() -> SharedState {
    AppState::new(Arc::new(MemoryStore::new()), AppConfig::default())
}

/// Register a fake socket for `player_id` and return the receiving end, so
/// tests can observe exactly what the engine pushes.
fn attach_client(state: &SharedState, player_id: PlayerId) -> UnboundedReceiver<Message> {
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .clients()
        .insert(player_id, ClientConnection { player_id, tx });
    rx
}

/// Drain everything currently queued for a fake socket, parsed as event JSON.
fn drain_events(rx: &mut UnboundedReceiver<Message>) -> Vec<Value> {
    let mut events = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let Message::Text(text) = message {
            events.push(serde_json::from_str(text.as_str()).expect("event is valid JSON"));
        }
    }
    events
}

async fn lobby_of_three(state: &SharedState) -> (LobbyJoinedResponse, PlayerId, PlayerId) {
    let created = lobby_service::create_lobby(state, "Alice").await.unwrap();
    let p2 = lobby_service::join_lobby(state, &created.lobby.code, "Bob")
        .await
        .unwrap();
    let p3 = lobby_service::join_lobby(state, &created.lobby.code, "Carol")
        .await
        .unwrap();
    (created, p2.player.id, p3.player.id)
}

#[tokio::test]
async fn create_and_join_produce_a_consistent_roster() {
    let state = test_state();
    let (created, p2, p3) = lobby_of_three(&state).await;

    assert_eq!(created.lobby.code.len(), 4);
    assert!(created.lobby.code.chars().all(|c| c.is_ascii_uppercase()));
    assert!(created.player.is_host);
    assert_eq!(created.lobby.phase, LobbyPhase::Waiting);

    let snapshot = lobby_service::get_state(&state, &created.lobby.code, Some(p2))
        .await
        .unwrap();
    let ids: Vec<_> = snapshot.players.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![created.player.id, p2, p3]);
    assert_eq!(snapshot.me.unwrap().id, p2);
}

#[tokio::test]
async fn join_is_case_insensitive_and_unknown_code_fails() {
    let state = test_state();
    let created = lobby_service::create_lobby(&state, "Alice").await.unwrap();

    let joined = lobby_service::join_lobby(&state, &created.lobby.code.to_lowercase(), "Bob")
        .await
        .unwrap();
    assert_eq!(joined.lobby.id, created.lobby.id);

    let err = lobby_service::join_lobby(&state, "ZZZZ", "Eve")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn start_requires_three_players_and_the_host() {
    let state = test_state();
    let created = lobby_service::create_lobby(&state, "Alice").await.unwrap();
    let p2 = lobby_service::join_lobby(&state, &created.lobby.code, "Bob")
        .await
        .unwrap();

    let err = game_service::start_game(&state, created.lobby.id, created.player.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InsufficientPlayers { have: 2, need: 3 }
    ));

    lobby_service::join_lobby(&state, &created.lobby.code, "Carol")
        .await
        .unwrap();

    let err = game_service::start_game(&state, created.lobby.id, p2.player.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn start_assigns_exactly_one_impostor_for_three_players() {
    let state = test_state();
    let (created, _, _) = lobby_of_three(&state).await;
    let mut rx = attach_client(&state, created.player.id);

    let summary = game_service::start_game(&state, created.lobby.id, created.player.id)
        .await
        .unwrap();
    assert_eq!(summary.phase, LobbyPhase::Playing);

    let roster = state.store().players(created.lobby.id);
    let impostors = roster
        .iter()
        .filter(|p| p.role == Some(Role::Impostor))
        .count();
    let innocents = roster
        .iter()
        .filter(|p| p.role == Some(Role::Innocent))
        .count();
    assert_eq!(impostors, 1);
    assert_eq!(innocents, 2);

    // The drawn word reaches every innocent; impostors see nothing by default.
    let lobby = state.store().lobby(created.lobby.id).unwrap();
    assert!(!lobby.settings.word.is_empty());
    for player in &roster {
        match player.role {
            Some(Role::Innocent) => assert_eq!(player.word, lobby.settings.word),
            Some(Role::Impostor) => assert!(player.word.is_empty()),
            None => panic!("player left unassigned"),
        }
    }

    // The host received a private game_start with their own role only.
    let events = drain_events(&mut rx);
    let start = events
        .iter()
        .find(|event| event["type"] == "game_start")
        .expect("host receives game_start");
    assert_eq!(start["payload"]["me"]["id"], created.player.id);
    assert!(start["payload"]["players"][0].get("role").is_none());
    assert!(
        start["payload"]["lobby"]["settings"].get("word").is_none(),
        "secret word must not appear in public settings"
    );
}

#[tokio::test]
async fn settings_are_host_only_and_frozen_once_started() {
    let state = test_state();
    let (created, p2, _) = lobby_of_three(&state).await;

    let request = UpdateSettingsRequest {
        player_id: p2,
        num_impostors: Some(2),
        category: None,
        word: None,
        hint: None,
        give_hint: None,
    };
    let err = lobby_service::update_settings(&state, created.lobby.id, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    let lobby = state.store().lobby(created.lobby.id).unwrap();
    assert_eq!(lobby.settings.num_impostors, 1);

    let request = UpdateSettingsRequest {
        player_id: created.player.id,
        num_impostors: None,
        category: Some("Animals".to_string()),
        word: None,
        hint: None,
        give_hint: Some(true),
    };
    let summary = lobby_service::update_settings(&state, created.lobby.id, &request)
        .await
        .unwrap();
    assert_eq!(summary.settings.category, "Animals");
    assert!(summary.settings.give_hint);
    // Unspecified fields survive the merge.
    assert_eq!(summary.settings.num_impostors, 1);

    game_service::start_game(&state, created.lobby.id, created.player.id)
        .await
        .unwrap();

    let request = UpdateSettingsRequest {
        player_id: created.player.id,
        num_impostors: Some(2),
        category: None,
        word: None,
        hint: None,
        give_hint: None,
    };
    let err = lobby_service::update_settings(&state, created.lobby.id, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn leaving_is_restricted_to_self_host_and_waiting_phase() {
    let state = test_state();
    let (created, p2, p3) = lobby_of_three(&state).await;
    let host = created.player.id;

    // Non-host players cannot remove each other.
    let err = lobby_service::leave_lobby(&state, created.lobby.id, p2, p3)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    // The host stays for the lobby's lifetime.
    let err = lobby_service::leave_lobby(&state, created.lobby.id, host, host)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    lobby_service::leave_lobby(&state, created.lobby.id, p3, p3)
        .await
        .unwrap();
    lobby_service::join_lobby(&state, &created.lobby.code, "Dave")
        .await
        .unwrap();
    assert_eq!(state.store().players(created.lobby.id).len(), 3);

    game_service::start_game(&state, created.lobby.id, host)
        .await
        .unwrap();
    let err = lobby_service::leave_lobby(&state, created.lobby.id, p2, p2)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn unanimous_vote_ejects_and_finishes_the_round() {
    let state = test_state();
    let (created, p2, p3) = lobby_of_three(&state).await;
    let host = created.player.id;
    let mut rx = attach_client(&state, host);

    game_service::start_game(&state, created.lobby.id, host)
        .await
        .unwrap();
    let ejected_role = state.store().player(p2).unwrap().role.unwrap();

    for voter in [host, p2, p3] {
        let response = game_service::vote(&state, created.lobby.id, voter, Some(p2))
            .await
            .unwrap();
        assert!(response.success);
    }

    let lobby = state.store().lobby(created.lobby.id).unwrap();
    assert_eq!(lobby.phase, LobbyPhase::Finished);

    let events = drain_events(&mut rx);
    let over = events
        .iter()
        .find(|event| event["type"] == "game_over")
        .expect("host receives game_over");
    assert_eq!(over["payload"]["ejected_id"], p2);
    assert_eq!(over["payload"]["reason"], "vote");
    let expected_winner = match ejected_role {
        Role::Impostor => "innocent",
        Role::Innocent => "impostor",
    };
    assert_eq!(over["payload"]["winner"], expected_winner);
}

#[tokio::test]
async fn skip_outcome_resets_votes_and_continues_the_round() {
    let state = test_state();
    let (created, p2, p3) = lobby_of_three(&state).await;
    let host = created.player.id;
    let mut rx = attach_client(&state, p3);

    game_service::start_game(&state, created.lobby.id, host)
        .await
        .unwrap();

    // {skip:2, p2:1} -> skips reach the top count, so nobody is ejected.
    game_service::vote(&state, created.lobby.id, host, Some(p2))
        .await
        .unwrap();
    game_service::vote(&state, created.lobby.id, p2, None)
        .await
        .unwrap();
    game_service::vote(&state, created.lobby.id, p3, None)
        .await
        .unwrap();

    let lobby = state.store().lobby(created.lobby.id).unwrap();
    assert_eq!(lobby.phase, LobbyPhase::Playing);
    for player in state.store().players(created.lobby.id) {
        assert!(!player.has_voted);
        assert_eq!(player.voted_for, None);
    }

    let events = drain_events(&mut rx);
    let over = events
        .iter()
        .find(|event| event["type"] == "game_over")
        .expect("skip resolution is broadcast");
    assert_eq!(over["payload"]["reason"], "skip");
    assert!(over["payload"]["winner"].is_null());
    assert!(over["payload"]["ejected_id"].is_null());
}

#[tokio::test]
async fn voting_twice_in_a_round_is_rejected() {
    let state = test_state();
    let (created, p2, _) = lobby_of_three(&state).await;
    let host = created.player.id;

    game_service::start_game(&state, created.lobby.id, host)
        .await
        .unwrap();

    game_service::vote(&state, created.lobby.id, host, Some(p2))
        .await
        .unwrap();
    let err = game_service::vote(&state, created.lobby.id, host, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyVoted));
}

#[tokio::test]
async fn votes_from_outside_the_lobby_are_forbidden() {
    let state = test_state();
    let (created, p2, _) = lobby_of_three(&state).await;
    let other = lobby_service::create_lobby(&state, "Mallory").await.unwrap();

    game_service::start_game(&state, created.lobby.id, created.player.id)
        .await
        .unwrap();

    let err = game_service::vote(&state, created.lobby.id, other.player.id, Some(p2))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn impostor_guess_ends_the_round_and_wrong_guess_does_not() {
    let state = test_state();
    let (created, _, p3) = lobby_of_three(&state).await;
    let host = created.player.id;

    game_service::start_game(&state, created.lobby.id, host)
        .await
        .unwrap();

    let roster = state.store().players(created.lobby.id);
    let impostor = roster
        .iter()
        .find(|p| p.role == Some(Role::Impostor))
        .unwrap()
        .id;
    let innocent = roster
        .iter()
        .find(|p| p.role == Some(Role::Innocent))
        .unwrap()
        .id;
    let mut rx = attach_client(&state, p3);

    let err = game_service::guess_word(&state, created.lobby.id, innocent, "whatever")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let response = game_service::guess_word(&state, created.lobby.id, impostor, "definitely wrong")
        .await
        .unwrap();
    assert!(!response.correct);
    assert!(!response.game_over);
    assert_eq!(
        state.store().lobby(created.lobby.id).unwrap().phase,
        LobbyPhase::Playing
    );

    // Case and surrounding whitespace are ignored.
    let secret = state.store().lobby(created.lobby.id).unwrap().settings.word;
    let sloppy = format!("  {}  ", secret.to_uppercase());
    let response = game_service::guess_word(&state, created.lobby.id, impostor, &sloppy)
        .await
        .unwrap();
    assert!(response.correct);
    assert!(response.game_over);
    assert_eq!(
        state.store().lobby(created.lobby.id).unwrap().phase,
        LobbyPhase::Finished
    );

    let events = drain_events(&mut rx);
    let over = events
        .iter()
        .find(|event| event["type"] == "game_over")
        .expect("guess resolution is broadcast");
    assert_eq!(over["payload"]["winner"], "impostor");
    assert_eq!(over["payload"]["reason"], "guess");
}

#[tokio::test]
async fn simultaneous_votes_resolve_exactly_once() {
    let state = test_state();
    let created = lobby_service::create_lobby(&state, "Alice").await.unwrap();
    let mut players = vec![created.player.id];
    for name in ["Bob", "Carol", "Dave", "Erin"] {
        let joined = lobby_service::join_lobby(&state, &created.lobby.code, name)
            .await
            .unwrap();
        players.push(joined.player.id);
    }
    let mut rx = attach_client(&state, created.player.id);

    game_service::start_game(&state, created.lobby.id, created.player.id)
        .await
        .unwrap();
    drain_events(&mut rx);

    let target = players[1];
    let mut handles = Vec::new();
    for voter in players.clone() {
        let state = state.clone();
        let lobby_id = created.lobby.id;
        handles.push(tokio::spawn(async move {
            game_service::vote(&state, lobby_id, voter, Some(target)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let lobby = state.store().lobby(created.lobby.id).unwrap();
    assert_eq!(lobby.phase, LobbyPhase::Finished);

    // Exactly one resolution reached the client: never zero, never double.
    let events = drain_events(&mut rx);
    let game_overs = events
        .iter()
        .filter(|event| event["type"] == "game_over")
        .count();
    assert_eq!(game_overs, 1);

    // The round is over; further votes are rejected.
    let err = game_service::vote(&state, created.lobby.id, players[2], None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}
