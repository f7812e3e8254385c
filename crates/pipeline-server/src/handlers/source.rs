//! Source administration handler.

use axum::{extract::State, response::Json};
use tracing::instrument;

use super::cache::InvalidateResponse;
use crate::error::AppError;
use crate::state::AppState;

/// POST /source/refresh
/// Recarga la fuente y luego vacia la cache.
#[instrument(skip_all)]
pub async fn refresh_source(
    State(state): State<AppState>,
) -> Result<Json<InvalidateResponse>, AppError> {
    let source = state.source();
    if !source.supports_refresh() {
        return Err(AppError::BadRequest(format!(
            "source '{}' does not support refresh",
            source.name()
        )));
    }

    let count = state.engine().refresh_source().await?;

    tracing::info!(source = source.name(), count = count, "Source refreshed");

    Ok(Json(InvalidateResponse {
        invalidated: count,
        message: format!("Source '{}' refreshed, {} cache entries dropped", source.name(), count),
    }))
}
