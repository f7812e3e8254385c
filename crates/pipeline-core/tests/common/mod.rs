#![allow(dead_code)]
use chrono::{DateTime, TimeZone, Utc};
use pipeline_core::{FilterSet, MetricKind, MetricResponse, MetricWindow, Params};

/// Fixed computation instant used across fixtures.
pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 2, 9, 30, 0).unwrap()
}

/// Helper to build a filter set from literal pairs.
/// Panics on invalid input (intended for tests).
pub fn filters(pairs: &[(&str, &str)]) -> FilterSet {
    FilterSet::from_pairs(pairs.iter().copied()).expect("invalid test filters")
}

/// A fully populated win-rate response.
pub fn win_rate_response() -> MetricResponse {
    let mut params = Params::new();
    params.insert("awards".into(), 8.into());
    params.insert("losses".into(), 2.into());

    MetricResponse::with_value(
        MetricKind::WinRate,
        MetricWindow::Rolling90d,
        0.8,
        "bid_records",
        as_of(),
    )
    .with_samples(10)
    .with_params(params)
}
