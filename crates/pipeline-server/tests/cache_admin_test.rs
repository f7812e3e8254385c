//! Tests de administracion de cache y recarga de la fuente.

mod helpers;

use std::io::Write;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use helpers::{TestApp, static_app};
use pipeline_core::{Clock, ManualClock};
use pipeline_sources::{PortfolioSettings, RecordSource};
use serde_json::{Value, json};

async fn warm(app: &TestApp) {
    for uri in [
        "/kpis/win_rate?window=all_time",
        "/kpis/win_rate?window=fiscal_ytd",
        "/kpis/pipeline_value?window=all_time",
        "/kpis/awarded_ytd?window=fiscal_ytd&state=tx",
    ] {
        app.client.get(uri).await.assert_status(StatusCode::OK);
    }
}

#[tokio::test]
async fn stats_lists_sorted_keys() {
    let (app, _source) = static_app();
    warm(&app).await;

    let json: Value = app.client.get("/cache/stats").await.json();
    assert_eq!(json["size"], 4);

    let keys: Vec<&str> = json["keys"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k.as_str().unwrap())
        .collect();
    assert_eq!(
        keys,
        vec![
            r#"awarded_ytd:fiscal_ytd:{"state":"tx"}:2026-04-02"#,
            "pipeline_value:all_time:{}:2026-04-02",
            "win_rate:all_time:{}:2026-04-02",
            "win_rate:fiscal_ytd:{}:2026-04-02",
        ]
    );
}

#[tokio::test]
async fn delete_metric_leaves_others() {
    let (app, source) = static_app();
    warm(&app).await;

    let response = app.client.delete("/cache/win_rate").await;
    response.assert_status(StatusCode::OK);

    let json: Value = response.json();
    assert_eq!(json["invalidated"], 2);

    let stats = app.state.cache().stats();
    assert_eq!(stats.size, 2);
    assert!(stats.keys.iter().all(|k| !k.starts_with("win_rate:")));

    // La siguiente peticion vuelve a la fuente
    app.client.get("/kpis/win_rate?window=all_time").await;
    assert_eq!(source.calls(), 5);
}

#[tokio::test]
async fn delete_unknown_metric_is_bad_request() {
    let (app, _source) = static_app();

    app.client
        .delete("/cache/conversion")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalidate_by_patterns() {
    let (app, _source) = static_app();
    warm(&app).await;

    let response = app
        .client
        .post_json(
            "/cache/invalidate",
            json!({ "patterns": ["*:fiscal_ytd:*", "pipeline_value:*"] }),
        )
        .await;
    response.assert_status(StatusCode::OK);

    let json: Value = response.json();
    assert_eq!(json["invalidated"], 3);
    assert_eq!(
        app.state.cache().stats().keys,
        vec!["win_rate:all_time:{}:2026-04-02".to_string()]
    );
}

#[tokio::test]
async fn invalidate_requires_patterns() {
    let (app, _source) = static_app();

    app.client
        .post_json("/cache/invalidate", json!({ "patterns": [] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn clear_drops_everything() {
    let (app, _source) = static_app();
    warm(&app).await;

    let json: Value = app.client.delete("/cache").await.json();
    assert_eq!(json["invalidated"], 4);
    assert_eq!(app.state.cache().stats().size, 0);
}

#[tokio::test]
async fn refresh_unsupported_source_is_bad_request() {
    let (app, _source) = static_app();
    warm(&app).await;

    app.client
        .post("/source/refresh")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(app.state.cache().stats().size, 4);
}

const BEFORE: &str = r#"
records:
  - { id: a, state: TX, stage: bidding, status: awarded, value: 100,
      submitted_on: 2026-03-01, decided_on: 2026-03-10 }
"#;

const AFTER: &str = r#"
records:
  - { id: a, state: TX, stage: bidding, status: awarded, value: 100,
      submitted_on: 2026-03-01, decided_on: 2026-03-10 }
  - { id: b, state: TX, stage: bidding, status: awarded, value: 250,
      submitted_on: 2026-03-05, decided_on: 2026-03-20 }
"#;

#[tokio::test]
async fn refresh_reloads_records_and_clears_cache() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(BEFORE.as_bytes()).unwrap();
    file.flush().unwrap();

    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 4, 2, 9, 30, 0).unwrap());
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());
    let source = RecordSource::open(file.path(), PortfolioSettings::default(), shared)
        .await
        .unwrap();
    let app = TestApp::with_source_and_clock(Arc::new(source), clock);

    let json: Value = app.client.get("/kpis/awarded_ytd?window=fiscal_ytd").await.json();
    assert_eq!(json["value"], 100.0);
    assert_eq!(json["source"], "bid_records");

    std::fs::write(file.path(), AFTER).unwrap();

    let response = app.client.post("/source/refresh").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["invalidated"], 1);

    let json: Value = app.client.get("/kpis/awarded_ytd?window=fiscal_ytd").await.json();
    assert_eq!(json["value"], 350.0);
    assert_eq!(json["samples"], 2);
}
