//! KPI endpoint handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use pipeline_core::{FilterSet, MetricKind, MetricResponse, MetricWindow};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;

use crate::engine::Dashboard;
use crate::error::AppError;
use crate::state::AppState;

/// Query parameter que selecciona la ventana; el resto son filtros.
pub const WINDOW_PARAM: &str = "window";

/// Separa la ventana de los filtros y valida ambos.
///
/// Sin `window` se usa `rolling_90d`.
pub fn parse_query(params: &[(String, String)]) -> Result<(MetricWindow, FilterSet), AppError> {
    let mut window = MetricWindow::default();
    let mut filters = FilterSet::new();

    for (key, value) in params {
        if key == WINDOW_PARAM {
            window = MetricWindow::from_str(value.trim())?;
        } else {
            filters.insert(key, value)?;
        }
    }

    Ok((window, filters))
}

/// GET /kpis/{metric}
#[instrument(skip_all, fields(metric = %metric))]
pub async fn get_metric(
    State(state): State<AppState>,
    Path(metric): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Arc<MetricResponse>>, AppError> {
    let metric = MetricKind::from_str(&metric)?;
    let (window, filters) = parse_query(&params)?;

    let response = state
        .engine()
        .compute_metric(metric, &filters, window)
        .await?;

    Ok(Json(response))
}

/// GET /kpis
/// Todas las metricas del catalogo para la misma ventana y filtros.
#[instrument(skip_all)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Dashboard>, AppError> {
    let (window, filters) = parse_query(&params)?;

    tracing::debug!(window = %window, filters = %filters, "Computing dashboard");

    let dashboard = state.engine().compute_dashboard(&filters, window).await?;
    Ok(Json(dashboard))
}
