//! Audit trail for computed metrics.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pipeline_core::{FilterSet, MetricKind, MetricResponse, MetricWindow, Params};
use serde::Serialize;

/// One computed (non-cached) metric invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub metric: MetricKind,
    pub value: Option<f64>,
    pub window: MetricWindow,
    pub params: Params,
    pub filters: FilterSet,
    pub source: String,
    pub samples: Option<u64>,
    pub reason: Option<String>,
    pub as_of: DateTime<Utc>,
}

impl AuditRecord {
    /// Builds the record for a freshly computed response.
    pub fn from_response(response: &MetricResponse, filters: &FilterSet) -> Self {
        Self {
            metric: response.metric,
            value: response.value,
            window: response.window,
            params: response.params.clone(),
            filters: filters.clone(),
            source: response.source.clone(),
            samples: response.samples,
            reason: response.reason.clone(),
            as_of: response.as_of,
        }
    }
}

/// Receives audit records. Implementations must not block.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord);
}

/// Emits each record as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) {
        let params = serde_json::to_string(&record.params).unwrap_or_default();

        tracing::info!(
            target: "pipeline::audit",
            metric = %record.metric,
            value = ?record.value,
            window = %record.window,
            filters = %record.filters,
            params = %params,
            source = %record.source,
            samples = ?record.samples,
            reason = ?record.reason,
            as_of = %record.as_of.to_rfc3339(),
            "Metric computed"
        );
    }
}

/// Keeps records in memory, for tests and for embedding.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: &AuditRecord) {
        self.records.lock().push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_serializes_filters_as_object() {
        let as_of = Utc.with_ymd_and_hms(2026, 4, 2, 9, 30, 0).unwrap();
        let response = MetricResponse::with_value(
            MetricKind::WinRate,
            MetricWindow::Rolling90d,
            0.8,
            "bid_records",
            as_of,
        )
        .with_samples(10);
        let filters = FilterSet::from_pairs([("state", "TX")]).unwrap();

        let record = AuditRecord::from_response(&response, &filters);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["metric"], "win_rate");
        assert_eq!(json["filters"]["state"], "tx");
        assert_eq!(json["samples"], 10);
        assert!(json["reason"].is_null());
    }

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemoryAuditSink::new();
        let response = MetricResponse::unavailable(
            MetricKind::WinRate,
            MetricWindow::AllTime,
            "",
            "static",
            Utc::now(),
        );

        sink.record(&AuditRecord::from_response(&response, &FilterSet::new()));
        TracingAuditSink.record(&AuditRecord::from_response(&response, &FilterSet::new()));

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.records()[0].reason.as_deref(), Some("insufficient samples"));
    }
}
