//! Health check endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Readiness response listing the configured collaborators
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub backends: Backends,
}

/// Configured collaborator names
#[derive(Serialize)]
pub struct Backends {
    pub stt: &'static str,
    pub llm: String,
    pub tts: &'static str,
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe - which collaborators will serve turns?
async fn ready(State(state): State<Arc<ApiState>>) -> Json<ReadinessResponse> {
    let (stt, llm, tts) = state.turn.backends();
    Json(ReadinessResponse {
        status: "ok",
        backends: Backends {
            stt,
            llm: llm.to_string(),
            tts,
        },
    })
}

/// Build health router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(state)
}
