//! Liveness endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_id: String,
    pub version: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_id: state.gateway.config().model_id.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
