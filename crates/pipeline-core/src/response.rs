//! The metric response envelope.
//!
//! `MetricResponse` is the JSON contract consumed by dashboards and the
//! audit trail. Field names and types must stay stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{MetricKind, MetricWindow};

/// Reason reported when a value cannot be derived from the available data.
pub const INSUFFICIENT_SAMPLES: &str = "insufficient samples";

/// Derivation inputs recorded alongside a value, for auditability.
pub type Params = BTreeMap<String, serde_json::Value>;

/// A computed metric.
///
/// A `null` value always comes with a non-empty `reason`, so consumers can
/// tell "not enough data" apart from a failed computation (which is an
/// error and never produces a response).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResponse {
    pub metric: MetricKind,

    pub value: Option<f64>,

    pub window: MetricWindow,

    pub params: Params,

    /// Time of computation. Cached responses keep their original stamp.
    pub as_of: DateTime<Utc>,

    /// Provenance label (the aggregate source's name).
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<u64>,
}

impl MetricResponse {
    /// Creates a response carrying a numeric value.
    ///
    /// A non-finite value is never reported: it is turned into `null`
    /// with [`INSUFFICIENT_SAMPLES`] as the reason.
    pub fn with_value(
        metric: MetricKind,
        window: MetricWindow,
        value: f64,
        source: impl Into<String>,
        as_of: DateTime<Utc>,
    ) -> Self {
        if !value.is_finite() {
            return Self::unavailable(metric, window, INSUFFICIENT_SAMPLES, source, as_of);
        }

        Self {
            metric,
            value: Some(value),
            window,
            params: Params::new(),
            as_of,
            source: source.into(),
            reason: None,
            samples: None,
        }
    }

    /// Creates a response whose value could not be derived.
    ///
    /// An empty reason is replaced by [`INSUFFICIENT_SAMPLES`].
    pub fn unavailable(
        metric: MetricKind,
        window: MetricWindow,
        reason: impl Into<String>,
        source: impl Into<String>,
        as_of: DateTime<Utc>,
    ) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            INSUFFICIENT_SAMPLES.to_string()
        } else {
            reason
        };

        Self {
            metric,
            value: None,
            window,
            params: Params::new(),
            as_of,
            source: source.into(),
            reason: Some(reason),
            samples: None,
        }
    }

    /// Attaches the sample count.
    pub fn with_samples(mut self, samples: u64) -> Self {
        self.samples = Some(samples);
        self
    }

    /// Attaches the derivation inputs.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Returns true if the value was suppressed.
    pub fn is_unavailable(&self) -> bool {
        self.value.is_none()
    }
}
