//! Health check service.

use crate::dto::health::HealthResponse;

/// Respond with a static health payload; the in-memory store cannot degrade.
pub fn health_status() -> HealthResponse {
    HealthResponse::ok()
}
