//! Application state.

use std::sync::Arc;

use pipeline_sources::AggregateSource;

use crate::cache::MetricCache;
use crate::engine::MetricsEngine;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<MetricsEngine>,
}

impl AppState {
    pub fn new(engine: MetricsEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &MetricsEngine {
        &self.engine
    }

    pub fn cache(&self) -> &MetricCache {
        self.engine.cache()
    }

    pub fn source(&self) -> &dyn AggregateSource {
        self.engine.source().as_ref()
    }
}
