//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
}

impl StatusResponse {
    fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse::new("alive"))
}

/// Readiness probe endpoint.
///
/// Returns 200 OK when the device store answers, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(StatusResponse::new("ready"))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StatusResponse::new("unavailable")),
            )
        }
    }
}
