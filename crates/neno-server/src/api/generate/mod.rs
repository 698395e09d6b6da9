//! Text-generation resource.

mod handlers;

use axum::{routing::post, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(handlers::generate))
}
