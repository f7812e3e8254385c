use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// GET /health
/// `DOWN` con 503 cuando la fuente de agregados no responde.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let source = state.source();

    match source.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "UP".to_string(),
                source: source.name().to_string(),
                detail: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(source = source.name(), error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "DOWN".to_string(),
                    source: source.name().to_string(),
                    detail: Some(e.to_string()),
                }),
            )
        },
    }
}
