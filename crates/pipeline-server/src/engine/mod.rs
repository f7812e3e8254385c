//! Metric derivation on top of the cache.

pub mod audit;
pub mod derive;
pub mod error;

pub use audit::{AuditRecord, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use derive::{Derivation, TARGET_NOT_CONFIGURED, derive};
pub use error::EngineError;

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pipeline_core::{Clock, FilterSet, MetricKind, MetricResponse, MetricWindow};
use pipeline_sources::{AggregateQuery, AggregateSource};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::MetricCache;
use crate::metrics::EngineMetrics;
use crate::metrics::engine::ComputeOutcome;

/// Every catalogue metric for one filter set and window.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub window: MetricWindow,
    pub filters: FilterSet,
    pub metrics: Vec<Arc<MetricResponse>>,
}

/// Derives KPIs from raw aggregates, consulting the cache first.
///
/// A computed response goes through the audit sink and then into the cache.
/// Upstream failures are returned as-is: nothing is cached and nothing is
/// audited. A response whose fetch overlapped a refresh or an invalidation
/// is returned to its caller but not cached.
#[derive(Clone)]
pub struct MetricsEngine {
    cache: MetricCache,
    source: Arc<dyn AggregateSource>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    ttl_overrides: HashMap<MetricKind, Duration>,
    metrics: EngineMetrics,
}

impl MetricsEngine {
    pub fn new(cache: MetricCache, source: Arc<dyn AggregateSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            source,
            audit: Arc::new(TracingAuditSink),
            clock,
            ttl_overrides: HashMap::new(),
            metrics: EngineMetrics,
        }
    }

    /// Replaces the audit sink.
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Sets a TTL for one metric, taking precedence over its built-in TTL.
    pub fn with_ttl_override(mut self, metric: MetricKind, ttl: Duration) -> Self {
        self.ttl_overrides.insert(metric, ttl);
        self
    }

    pub fn with_ttl_overrides(mut self, overrides: HashMap<MetricKind, Duration>) -> Self {
        self.ttl_overrides.extend(overrides);
        self
    }

    /// TTL used when storing `metric`.
    pub fn ttl_for(&self, metric: MetricKind) -> Duration {
        self.ttl_overrides
            .get(&metric)
            .copied()
            .or_else(|| metric.ttl())
            .unwrap_or_else(|| self.cache.default_ttl())
    }

    pub fn cache(&self) -> &MetricCache {
        &self.cache
    }

    pub fn source(&self) -> &Arc<dyn AggregateSource> {
        &self.source
    }

    /// Returns the response for `metric`, from cache when fresh.
    pub async fn compute_metric(
        &self,
        metric: MetricKind,
        filters: &FilterSet,
        window: MetricWindow,
    ) -> Result<Arc<MetricResponse>, EngineError> {
        if let Some(cached) = self.cache.get(metric, filters, window).await {
            debug!(metric = %metric, window = %window, "Serving cached metric");
            self.metrics.record_outcome(metric, ComputeOutcome::Cached);
            return Ok(cached);
        }

        let start = Instant::now();
        let generation = self.cache.generation(metric);
        let query = AggregateQuery::new(metric, filters.clone(), window);

        let aggregates = match self.source.fetch_aggregates(&query).await {
            Ok(aggregates) => aggregates,
            Err(e) => {
                warn!(query = %query, source = self.source.name(), error = %e, "Aggregate fetch failed");
                self.metrics
                    .record_outcome(metric, ComputeOutcome::UpstreamError);
                return Err(e.into());
            },
        };

        let derivation = derive(metric, &aggregates);
        let as_of = self.clock.now();
        let source = self.source.name();

        let response = match derivation.value {
            Ok(value) => MetricResponse::with_value(metric, window, value, source, as_of),
            Err(reason) => MetricResponse::unavailable(metric, window, reason, source, as_of),
        }
        .with_samples(derivation.samples)
        .with_params(derivation.params);

        let outcome = if response.is_unavailable() {
            ComputeOutcome::Unavailable
        } else {
            ComputeOutcome::Computed
        };

        self.audit.record(&AuditRecord::from_response(&response, filters));

        let (stored, _) = self
            .cache
            .set_if_current(
                metric,
                filters,
                window,
                response,
                Some(self.ttl_for(metric)),
                generation,
            )
            .await;

        self.metrics.record_outcome(metric, outcome);
        self.metrics.record_compute_duration(metric, start.elapsed());

        Ok(stored)
    }

    /// Parses raw request values, then computes.
    ///
    /// Contract violations are reported before the cache or the source is
    /// touched.
    pub async fn compute_by_name<I, K, V>(
        &self,
        metric: &str,
        filters: I,
        window: &str,
    ) -> Result<Arc<MetricResponse>, EngineError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let metric = MetricKind::from_str(metric)?;
        let window = MetricWindow::from_str(window)?;
        let filters = FilterSet::from_pairs(filters)?;

        self.compute_metric(metric, &filters, window).await
    }

    /// Computes every catalogue metric in order.
    ///
    /// Stops at the first upstream failure. Metrics computed before the
    /// failure stay cached individually.
    pub async fn compute_dashboard(
        &self,
        filters: &FilterSet,
        window: MetricWindow,
    ) -> Result<Dashboard, EngineError> {
        let mut metrics = Vec::with_capacity(MetricKind::ALL.len());
        for metric in MetricKind::ALL {
            metrics.push(self.compute_metric(metric, filters, window).await?);
        }

        Ok(Dashboard {
            window,
            filters: filters.clone(),
            metrics,
        })
    }

    /// Reloads the source, then drops every cached response.
    ///
    /// Returns the number of cache entries dropped.
    pub async fn refresh_source(&self) -> Result<usize, EngineError> {
        self.source.refresh().await?;
        Ok(self.cache.clear().await)
    }
}
