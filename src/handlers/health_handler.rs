use std::sync::Arc;

use axum::{Extension, Json};
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
}

pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    let store = if state.store().is_some() {
        "configured"
    } else {
        "missing"
    };

    Json(HealthResponse { status: "ok", store })
}
