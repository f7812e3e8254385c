//! Fixed-value aggregate source.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use pipeline_core::MetricKind;

use crate::error::SourceError;
use crate::source::{AggregateQuery, AggregateSource, Aggregates};

/// Returns preconfigured aggregates and counts how often it was asked.
///
/// Useful for demos and for asserting cache behaviour: every call that
/// reaches the source increments [`StaticSource::calls`].
///
/// # Example
///
/// ```
/// use pipeline_core::MetricKind;
/// use pipeline_sources::{Aggregates, StaticSource};
///
/// let source = StaticSource::new(Aggregates::decisions(8, 2))
///     .with_metric(MetricKind::PipelineValue, Aggregates::default());
/// assert_eq!(source.calls(), 0);
/// ```
#[derive(Debug, Default)]
pub struct StaticSource {
    default: Aggregates,
    per_metric: HashMap<MetricKind, Aggregates>,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl StaticSource {
    /// Creates a source that answers every query with `default`.
    pub fn new(default: Aggregates) -> Self {
        Self {
            default,
            ..Self::default()
        }
    }

    /// Overrides the answer for one metric.
    pub fn with_metric(mut self, metric: MetricKind, aggregates: Aggregates) -> Self {
        self.per_metric.insert(metric, aggregates);
        self
    }

    /// Makes every subsequent fetch fail with `SourceError::Unavailable`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock() = Some(reason.into());
    }

    /// Restores normal answers.
    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Number of fetches received, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AggregateSource for StaticSource {
    async fn fetch_aggregates(&self, query: &AggregateQuery) -> Result<Aggregates, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = self.failure.lock().clone() {
            return Err(SourceError::unavailable(reason));
        }

        Ok(self
            .per_metric
            .get(&query.metric())
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }

    fn name(&self) -> &str {
        "static"
    }
}
