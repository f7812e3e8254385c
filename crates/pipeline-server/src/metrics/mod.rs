//! Prometheus metrics for the KPI service.

pub mod cache;
pub mod engine;
pub mod http;
pub mod setup;

pub use cache::CacheMetrics;
pub use engine::EngineMetrics;
pub use setup::init_metrics;
