//! Test helpers para pipeline-server.

#![allow(dead_code, unused_imports)]

pub mod assertions;
pub mod client;

pub use assertions::*;
pub use client::{TestClient, TestResponse};

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pipeline_core::{Clock, ManualClock};
use pipeline_server::cache::CacheConfig;
use pipeline_server::engine::MemoryAuditSink;
use pipeline_server::metrics::setup::detached_handle;
use pipeline_server::{AppState, MetricCache, MetricsEngine, create_router_with_state};
use pipeline_sources::{AggregateSource, Aggregates, StaticSource};

/// Un servidor en memoria con sus colaboradores expuestos.
pub struct TestApp {
    pub client: TestClient,
    pub state: AppState,
    pub audit: Arc<MemoryAuditSink>,
    pub clock: ManualClock,
}

impl TestApp {
    /// Construye la app sobre cualquier fuente.
    pub fn with_source(source: Arc<dyn AggregateSource>) -> Self {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 4, 2, 9, 30, 0).unwrap());
        Self::with_source_and_clock(source, clock)
    }

    pub fn with_source_and_clock(source: Arc<dyn AggregateSource>, clock: ManualClock) -> Self {
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());
        let audit = Arc::new(MemoryAuditSink::new());

        let cache = MetricCache::new(CacheConfig::default(), shared.clone());
        let engine = MetricsEngine::new(cache, source, shared).with_audit(audit.clone());
        let state = AppState::new(engine);

        let client = TestClient::new(create_router_with_state(state.clone(), detached_handle()));

        Self {
            client,
            state,
            audit,
            clock,
        }
    }
}

/// Agregados con datos para todas las metricas del catalogo.
pub fn rich_aggregates() -> Aggregates {
    Aggregates {
        samples: 13,
        awards: 8,
        losses: 2,
        awarded_value: 4_000_000.0,
        open_bids: 3,
        pipeline_value: 3_000_000.0,
        backlog_value: 2_000_000.0,
        total_capacity: 10_000_000.0,
        annual_target: Some(10_000_000.0),
        months_elapsed: 6.0,
        months_remaining: 6.0,
        total_cycle_days: 300.0,
        cycle_samples: 10,
        ..Aggregates::default()
    }
}

/// App sobre un `StaticSource` con [`rich_aggregates`].
pub fn static_app() -> (TestApp, Arc<StaticSource>) {
    let source = Arc::new(StaticSource::new(rich_aggregates()));
    (TestApp::with_source(source.clone()), source)
}
