//! KPI formulas over raw aggregates.
//!
//! Derivation is pure: the same aggregates always give the same
//! [`Derivation`]. Degenerate inputs never panic and never produce a
//! non-finite number, they produce a reason instead.

use pipeline_core::{INSUFFICIENT_SAMPLES, MetricKind, Params};
use pipeline_sources::Aggregates;
use serde_json::json;

/// Reason reported by `projects_needed` when no target is configured.
pub const TARGET_NOT_CONFIGURED: &str = "annual target not configured";

/// Outcome of applying a metric formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    /// The derived value, or the reason it could not be derived.
    pub value: Result<f64, String>,
    /// Data points the value rests on.
    pub samples: u64,
    /// Inputs actually used by the formula.
    pub params: Params,
}

impl Derivation {
    fn new(samples: u64, params: Params) -> Self {
        Self {
            value: Err(INSUFFICIENT_SAMPLES.to_string()),
            samples,
            params,
        }
    }

    fn value(mut self, value: f64) -> Self {
        self.value = if value.is_finite() {
            Ok(value)
        } else {
            Err(INSUFFICIENT_SAMPLES.to_string())
        };
        self
    }

    fn unavailable(mut self, reason: impl Into<String>) -> Self {
        self.value = Err(reason.into());
        self
    }
}

/// Sample count a metric's floor is checked against.
pub fn sample_basis(metric: MetricKind, agg: &Aggregates) -> u64 {
    match metric {
        MetricKind::AwardedYtd
        | MetricKind::MonthlyAwardPace
        | MetricKind::ProjectedFyEnd
        | MetricKind::ProjectsNeeded => agg.awards,
        MetricKind::PipelineValue | MetricKind::CapacityIfAllBidsWin => agg.open_bids,
        MetricKind::WinRate => agg.awards.saturating_add(agg.losses),
        MetricKind::AvgPipelineVelocity => agg.cycle_samples,
    }
}

/// Applies the formula for `metric` to `agg`.
///
/// Order of precedence: an upstream null wins, then the derivation floor,
/// then the formula's own degeneracy checks.
pub fn derive(metric: MetricKind, agg: &Aggregates) -> Derivation {
    let samples = sample_basis(metric, agg);
    let derivation = Derivation::new(samples, params_for(metric, agg));

    if agg.upstream_null {
        let reason = agg
            .upstream_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(INSUFFICIENT_SAMPLES);
        return derivation.unavailable(reason);
    }

    if samples < metric.min_samples() {
        return derivation.unavailable(INSUFFICIENT_SAMPLES);
    }

    match metric {
        MetricKind::AwardedYtd => derivation.value(agg.awarded_value),
        MetricKind::PipelineValue => derivation.value(agg.pipeline_value),
        MetricKind::MonthlyAwardPace => match monthly_pace(agg) {
            Some(pace) => derivation.value(pace),
            None => derivation,
        },
        MetricKind::ProjectedFyEnd => match monthly_pace(agg) {
            Some(pace) => {
                derivation.value(agg.awarded_value + pace * agg.months_remaining.max(0.0))
            },
            None => derivation,
        },
        MetricKind::ProjectsNeeded => {
            let Some(target) = agg.annual_target else {
                return derivation.unavailable(TARGET_NOT_CONFIGURED);
            };
            let average = ratio(agg.awarded_value, agg.awards as f64);
            match average {
                Some(avg) if target > 0.0 && avg > 0.0 => {
                    let gap = (target - agg.awarded_value).max(0.0);
                    derivation.value((gap / avg).ceil())
                },
                _ => derivation,
            }
        },
        MetricKind::WinRate => {
            let decisions = agg.awards.saturating_add(agg.losses);
            match ratio(agg.awards as f64, decisions as f64) {
                Some(rate) => derivation.value(rate),
                None => derivation,
            }
        },
        MetricKind::AvgPipelineVelocity => {
            match ratio(agg.total_cycle_days, agg.cycle_samples as f64) {
                Some(days) => derivation.value(days),
                None => derivation,
            }
        },
        MetricKind::CapacityIfAllBidsWin => {
            match ratio(agg.backlog_value + agg.pipeline_value, agg.total_capacity) {
                Some(share) => derivation.value(share * 100.0),
                None => derivation,
            }
        },
    }
}

fn monthly_pace(agg: &Aggregates) -> Option<f64> {
    ratio(agg.awarded_value, agg.months_elapsed)
}

/// `num / den`, or `None` when the denominator is not a positive number.
fn ratio(num: f64, den: f64) -> Option<f64> {
    if den > 0.0 && den.is_finite() && num.is_finite() {
        Some(num / den)
    } else {
        None
    }
}

fn params_for(metric: MetricKind, agg: &Aggregates) -> Params {
    let mut params = Params::new();
    let mut put = |key: &str, value: serde_json::Value| {
        params.insert(key.to_string(), value);
    };

    match metric {
        MetricKind::AwardedYtd => {
            put("awards", json!(agg.awards));
            put("awarded_value", json!(agg.awarded_value));
        },
        MetricKind::PipelineValue => {
            put("open_bids", json!(agg.open_bids));
            put("pipeline_value", json!(agg.pipeline_value));
        },
        MetricKind::MonthlyAwardPace => {
            put("awards", json!(agg.awards));
            put("awarded_value", json!(agg.awarded_value));
            put("months_elapsed", json!(agg.months_elapsed));
        },
        MetricKind::ProjectedFyEnd => {
            put("awards", json!(agg.awards));
            put("awarded_value", json!(agg.awarded_value));
            put("months_elapsed", json!(agg.months_elapsed));
            put("months_remaining", json!(agg.months_remaining));
        },
        MetricKind::ProjectsNeeded => {
            put("awards", json!(agg.awards));
            put("awarded_value", json!(agg.awarded_value));
            put("annual_target", json!(agg.annual_target));
        },
        MetricKind::WinRate => {
            put("awards", json!(agg.awards));
            put("losses", json!(agg.losses));
        },
        MetricKind::AvgPipelineVelocity => {
            put("cycle_samples", json!(agg.cycle_samples));
            put("total_cycle_days", json!(agg.total_cycle_days));
        },
        MetricKind::CapacityIfAllBidsWin => {
            put("backlog_value", json!(agg.backlog_value));
            put("pipeline_value", json!(agg.pipeline_value));
            put("total_capacity", json!(agg.total_capacity));
            put(
                "capacity_value",
                json!(agg.backlog_value + agg.pipeline_value),
            );
        },
    }

    params
}
