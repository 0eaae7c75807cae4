//! Request, response, and push-event payload types.

use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Game action requests and responses.
pub mod game;
/// Health check response.
pub mod health;
/// Lobby lifecycle requests and public projections.
pub mod lobby;
/// Validation helpers for DTOs.
pub mod validation;
/// WebSocket message envelopes and payloads.
pub mod ws;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
