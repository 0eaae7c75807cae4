//! Per-player WebSocket connection lifecycle.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    dto::ws::{ClientMessage, ErrorPayload, ServerEvent},
    services::{lobby_service::lobby_update_payload, ws_events},
    state::{ClientConnection, SharedState},
};

const IDENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle the full lifecycle for an individual player WebSocket connection.
///
/// The first frame must be a `join` message binding the socket to a player id;
/// the server replies with a `lobby_update` snapshot. Reconnects are allowed:
/// a new socket for the same player simply replaces the registry entry.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let initial_message = match tokio::time::timeout(IDENT_TIMEOUT, receiver.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        Ok(Some(Ok(Message::Close(_)))) => {
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Ok(_))) => {
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Err(err))) => {
            warn!(error = %err, "websocket receive error");
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(None) | Err(_) => {
            warn!("websocket identification timed out");
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let inbound = match serde_json::from_str::<ClientMessage>(&initial_message) {
        Ok(message) => message,
        Err(err) => {
            warn!(error = %err, "failed to parse client message");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let ClientMessage::Join { player_id } = inbound else {
        warn!("first message was not a join");
        let _ = outbound_tx.send(Message::Close(None));
        finalize(writer_task, outbound_tx).await;
        return;
    };

    let Some(player) = state.store().player(player_id) else {
        warn!(player_id, "join for unknown player");
        send_error(&outbound_tx, "unknown player");
        let _ = outbound_tx.send(Message::Close(None));
        finalize(writer_task, outbound_tx).await;
        return;
    };

    state.clients().insert(
        player_id,
        ClientConnection {
            player_id,
            tx: outbound_tx.clone(),
        },
    );

    info!(player_id, "player connected");

    // Initial snapshot so a (re)connecting client catches up immediately.
    match state.store().lobby(player.lobby_id) {
        Some(lobby) => {
            let roster = state.store().players(lobby.id);
            let payload =
                lobby_update_payload(&(&lobby).into(), &roster, Some((&player).into()));
            match ServerEvent::json(ws_events::EVENT_LOBBY_UPDATE, &payload) {
                Ok(event) => ws_events::send_event(&state, player_id, &event),
                Err(err) => warn!(player_id, error = %err, "failed to serialize initial snapshot"),
            }
        }
        None => {
            warn!(
                player_id,
                lobby_id = player.lobby_id,
                "player references a missing lobby"
            );
            send_error(&outbound_tx, "lobby no longer exists");
        }
    }

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Join { .. }) => {
                    warn!(player_id, "ignoring duplicate join message");
                }
                Ok(ClientMessage::Unknown) => {
                    warn!(player_id, "ignoring unknown message type");
                }
                Err(err) => {
                    warn!(player_id, error = %err, "failed to parse client message");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(player_id, "player closed the socket");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(player_id, error = %err, "websocket error");
                break;
            }
        }
    }

    // Only drop the registry entry if it still belongs to this socket; a
    // reconnect may have replaced it already.
    state
        .clients()
        .remove_if(&player_id, |_, connection| connection.tx.same_channel(&outbound_tx));
    info!(player_id, "player disconnected");

    finalize(writer_task, outbound_tx).await;
}

fn send_error(tx: &mpsc::UnboundedSender<Message>, message: &str) {
    let payload = ErrorPayload {
        message: message.to_string(),
    };
    if let Ok(event) = ServerEvent::json(ws_events::EVENT_ERROR, &payload)
        && let Ok(text) = serde_json::to_string(&event)
    {
        let _ = tx.send(Message::Text(text.into()));
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
