//! Pipeline KPI server binary.

use std::sync::Arc;

use anyhow::Context;
use pipeline_core::{Clock, SystemClock};
use pipeline_server::{
    AppState, MetricCache, MetricsEngine, Settings, TracingAuditSink, metrics::init_metrics,
    run_server_with_state,
};
use pipeline_sources::RecordSource;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("invalid configuration")?;
    let addr = settings.addr()?;

    tracing::info!(
        "Starting Pipeline KPI Server v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Records: {}", settings.data.records_path.display());
    tracing::info!("Default TTL: {}s", settings.cache.ttl_seconds);

    let prometheus = init_metrics().context("failed to install metrics recorder")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let source = RecordSource::open(&settings.data.records_path, settings.portfolio(), clock.clone())
        .await
        .with_context(|| {
            format!(
                "failed to load bid records from {}",
                settings.data.records_path.display()
            )
        })?;

    let cache = MetricCache::new(settings.cache_config(), clock.clone());
    let engine = MetricsEngine::new(cache, Arc::new(source), clock)
        .with_audit(Arc::new(TracingAuditSink))
        .with_ttl_overrides(settings.ttl_overrides()?);

    run_server_with_state(addr, AppState::new(engine), prometheus).await?;

    Ok(())
}
