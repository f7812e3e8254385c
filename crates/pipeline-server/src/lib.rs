//! # Pipeline Server
//!
//! HTTP service exposing bid pipeline KPIs.
//!
//! [`MetricsEngine`] derives each KPI from the aggregates returned by an
//! [`AggregateSource`](pipeline_sources::AggregateSource) and keeps the
//! results in a [`MetricCache`] keyed by metric, window, filters and UTC
//! day. The axum router in [`server`] serves the responses and the cache
//! administration endpoints.

pub mod cache;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod state;

pub use cache::{CacheConfig, CacheKey, MetricCache};
pub use engine::{AuditSink, Dashboard, EngineError, MetricsEngine, TracingAuditSink};
pub use error::AppError;
pub use server::{create_router_with_state, run_server_with_state};
pub use settings::{Settings, SettingsError};
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
