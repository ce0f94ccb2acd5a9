//! Axum router wiring (HTTP -> WS upgrade).
//!
//! The chat endpoint lives at `/`, matching what clients dial.

use axum::{routing::get, Router};

use crate::{app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(transport::ws::ws_upgrade))
        .with_state(state)
}
