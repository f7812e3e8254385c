//! Tests de los endpoints de KPIs.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use helpers::{TestApp, assert_error_body, assert_metric_envelope, static_app};
use pipeline_core::MetricKind;
use pipeline_sources::{AggregateQuery, AggregateSource, Aggregates, SourceError, StaticSource};
use serde_json::Value;

// === Single metric ===

#[tokio::test]
async fn win_rate_scenario() {
    let source = Arc::new(StaticSource::new(Aggregates::decisions(8, 2)));
    let app = TestApp::with_source(source);

    let response = app.client.get("/kpis/win_rate?window=rolling_90d").await;
    response.assert_status(StatusCode::OK);
    response.assert_content_type_contains("application/json");

    let json: Value = response.json();
    assert_metric_envelope(&json);
    assert_eq!(json["metric"], "win_rate");
    assert_eq!(json["value"], 0.8);
    assert_eq!(json["samples"], 10);
    assert_eq!(json["window"], "rolling_90d");
    assert_eq!(json["source"], "static");
    assert!(json.get("reason").is_none());
}

#[tokio::test]
async fn window_defaults_to_rolling_90d() {
    let (app, _source) = static_app();

    let json: Value = app.client.get("/kpis/awarded_ytd").await.json();
    assert_eq!(json["window"], "rolling_90d");
}

#[tokio::test]
async fn every_metric_returns_a_complete_envelope() {
    let (app, _source) = static_app();

    for metric in MetricKind::ALL {
        let response = app
            .client
            .get(&format!("/kpis/{}?window=fiscal_ytd", metric))
            .await;
        response.assert_status(StatusCode::OK);

        let json: Value = response.json();
        assert_metric_envelope(&json);
        assert_eq!(json["metric"], metric.as_str());
    }
}

#[tokio::test]
async fn zero_decisions_give_null_with_reason() {
    let source = Arc::new(StaticSource::new(Aggregates::decisions(0, 0)));
    let app = TestApp::with_source(source);

    let json: Value = app.client.get("/kpis/win_rate").await.json();
    assert_metric_envelope(&json);
    assert!(json["value"].is_null());
    assert_eq!(json["reason"], "insufficient samples");
}

// === Cache ===

#[tokio::test]
async fn repeated_requests_hit_the_source_once() {
    let (app, source) = static_app();

    let first: Value = app
        .client
        .get("/kpis/win_rate?state=TX&stage=bidding")
        .await
        .json();
    app.clock.advance(Duration::from_secs(60));
    let second: Value = app
        .client
        .get("/kpis/win_rate?stage=Bidding&state=tx")
        .await
        .json();

    assert_eq!(source.calls(), 1);
    assert_eq!(app.audit.len(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn expired_entries_are_recomputed() {
    let (app, source) = static_app();

    app.client.get("/kpis/pipeline_value").await;
    app.clock.advance(Duration::from_secs(601));
    app.client.get("/kpis/pipeline_value").await;

    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn next_utc_day_is_a_new_entry() {
    let (app, source) = static_app();

    app.client.get("/kpis/win_rate").await;
    app.clock.advance(Duration::from_secs(24 * 3600));
    app.client.get("/kpis/win_rate").await;

    assert_eq!(source.calls(), 2);
}

// === Contract violations ===

#[tokio::test]
async fn unknown_window_is_bad_request() {
    let (app, source) = static_app();

    let response = app.client.get("/kpis/win_rate?window=last_week").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error_body(&response.json(), "Bad Request");
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn unknown_metric_is_bad_request() {
    let (app, source) = static_app();

    let response = app.client.get("/kpis/conversion_rate").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().contains("conversion_rate"));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn unknown_filter_is_bad_request() {
    let (app, source) = static_app();

    app.client
        .get("/kpis/win_rate?county=travis")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.client
        .get("/kpis/win_rate?state=")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(source.calls(), 0);
    assert_eq!(app.state.cache().stats().size, 0);
}

// === Upstream failures ===

#[tokio::test]
async fn transient_upstream_failure_is_503_and_not_cached() {
    let (app, source) = static_app();
    source.fail_with("connection refused");

    let response = app.client.get("/kpis/win_rate").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_error_body(&response.json(), "Service Unavailable");
    assert!(app.audit.is_empty());
    assert_eq!(app.state.cache().stats().size, 0);

    source.recover();
    app.client
        .get("/kpis/win_rate")
        .await
        .assert_status(StatusCode::OK);
    app.client.get("/kpis/win_rate").await;

    assert_eq!(source.calls(), 2);
    assert_eq!(app.audit.len(), 1);
}

/// Fuente que siempre devuelve datos corruptos.
struct CorruptSource;

#[async_trait]
impl AggregateSource for CorruptSource {
    async fn fetch_aggregates(&self, _query: &AggregateQuery) -> Result<Aggregates, SourceError> {
        Err(SourceError::InvalidData("duplicate record id 'b-1'".into()))
    }

    fn name(&self) -> &str {
        "corrupt"
    }
}

#[tokio::test]
async fn permanent_upstream_failure_is_502() {
    let app = TestApp::with_source(Arc::new(CorruptSource));

    let response = app.client.get("/kpis/win_rate").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    assert!(response.text().contains("duplicate record id"));
}

// === Dashboard ===

#[tokio::test]
async fn dashboard_returns_catalogue_in_order() {
    let (app, source) = static_app();

    let response = app.client.get("/kpis?window=current_month&state=OK").await;
    response.assert_status(StatusCode::OK);

    let json: Value = response.json();
    assert_eq!(json["window"], "current_month");
    assert_eq!(json["filters"]["state"], "ok");

    let metrics = json["metrics"].as_array().unwrap();
    assert_eq!(metrics.len(), MetricKind::ALL.len());
    for (entry, metric) in metrics.iter().zip(MetricKind::ALL) {
        assert_metric_envelope(entry);
        assert_eq!(entry["metric"], metric.as_str());
    }

    // Segunda llamada servida por completo desde cache
    app.client.get("/kpis?window=current_month&state=ok").await;
    assert_eq!(source.calls(), MetricKind::ALL.len());
}

#[tokio::test]
async fn dashboard_upstream_failure() {
    let (app, source) = static_app();
    source.fail_with("maintenance");

    app.client
        .get("/kpis")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(app.state.cache().stats().size, 0);
}
