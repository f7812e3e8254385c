//! Cache administration endpoint handlers.

use axum::{
    extract::{Path, State},
    response::Json,
};
use pipeline_core::MetricKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

use crate::cache::CacheStats;
use crate::error::AppError;
use crate::state::AppState;

/// Response para operaciones de invalidación.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Número de entries invalidadas.
    pub invalidated: usize,
    /// Mensaje descriptivo.
    pub message: String,
}

/// Request body para invalidación por patrones múltiples.
#[derive(Debug, Deserialize)]
pub struct InvalidateByPatternsRequest {
    /// Lista de patrones glob sobre `metric:window:filters:day`.
    pub patterns: Vec<String>,
}

/// GET /cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache().stats())
}

/// DELETE /cache
/// Invalida toda la cache.
#[instrument(skip_all)]
pub async fn clear_cache(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let count = state.cache().clear().await;

    tracing::info!(count = count, "All cache entries invalidated");

    Json(InvalidateResponse {
        invalidated: count,
        message: format!("Invalidated all {} cache entries", count),
    })
}

/// DELETE /cache/{metric}
/// Invalida todas las entries de una métrica.
#[instrument(skip_all, fields(metric = %metric))]
pub async fn invalidate_metric(
    State(state): State<AppState>,
    Path(metric): Path<String>,
) -> Result<Json<InvalidateResponse>, AppError> {
    let metric = MetricKind::from_str(&metric)?;
    let result = state.cache().invalidate_metric(metric).await;

    Ok(Json(InvalidateResponse {
        invalidated: result.count,
        message: format!(
            "Invalidated {} cache entries for metric '{}'",
            result.count, metric
        ),
    }))
}

/// POST /cache/invalidate
/// Invalida las entries que coincidan con cualquiera de los patrones.
#[instrument(skip_all, fields(patterns = body.patterns.len()))]
pub async fn invalidate_patterns(
    State(state): State<AppState>,
    Json(body): Json<InvalidateByPatternsRequest>,
) -> Result<Json<InvalidateResponse>, AppError> {
    if body.patterns.is_empty() {
        return Err(AppError::BadRequest(
            "at least one pattern is required".to_string(),
        ));
    }

    let result = state.cache().invalidate_by_patterns(&body.patterns).await;

    Ok(Json(InvalidateResponse {
        invalidated: result.count,
        message: format!(
            "Invalidated {} cache entries matching {}",
            result.count,
            result.patterns.join(", ")
        ),
    }))
}
