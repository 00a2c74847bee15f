use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub llm_provider: String,
    pub llm_configured: bool,
    pub evaluation_in_flight: bool,
}

/// Liveness plus the state of the model backend.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_provider: state.llm_provider.clone(),
        llm_configured: state.evaluator.is_some(),
        evaluation_in_flight: state.evaluator.as_ref().is_some_and(|e| e.is_busy()),
    })
}
