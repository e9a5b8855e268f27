//! Operational endpoints.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::app_state::AppState;

/// Liveness plus registry sizes.
pub async fn healthz(State(app): State<AppState>) -> Json<Value> {
    let svc = app.service();
    Json(json!({
        "status": "ok",
        "enforcers": svc.enforcer_count(),
        "adapters": svc.adapter_count(),
    }))
}
