//! Cache module for the KPI server.
//!
//! This module provides the metric cache layer using Moka, with
//! per-entry TTLs, day-scoped keys, pattern-based invalidation and
//! metrics.

pub mod invalidation;
pub mod keys;
pub mod metric_cache;

// Re-exports
pub use invalidation::InvalidationResult;
pub use keys::CacheKey;
pub use metric_cache::{CacheConfig, CacheEntry, CacheStats, Generation, MetricCache};
