//! Axum router wiring.
//!
//! - `POST /v1/casbin/:method` : policy calls (JSON in, JSON out)
//! - `POST /v1/notify`         : notification side-channel
//! - `GET  /healthz`           : liveness and registry sizes

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.cfg().server.max_body_bytes;
    Router::new()
        .route("/v1/casbin/:method", post(transport::http::call))
        .route("/v1/notify", post(transport::http::notify))
        .route("/healthz", get(ops::healthz))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
