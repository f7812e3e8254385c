//! Metric cache using Moka.

use crate::cache::keys::CacheKey;
use crate::metrics::CacheMetrics;
use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use pipeline_core::{Clock, FilterSet, MetricKind, MetricResponse, MetricWindow};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Configuracion del cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL en segundos (default: 600 = 10 minutos)
    pub ttl_seconds: u64,
    /// Maximo numero de entries (default: 10000)
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 600,
            max_capacity: 10_000,
        }
    }
}

impl CacheConfig {
    /// TTL por defecto como `Duration`.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Una entrada del cache con su marca de tiempo.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    value: Arc<MetricResponse>,
    stored_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    /// Visible mientras `now - stored_at <= ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        now.signed_duration_since(self.stored_at) <= ttl
    }

    pub fn value(&self) -> &Arc<MetricResponse> {
        &self.value
    }

    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Snapshot de introspeccion del cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Marca de invalidacion observada antes de calcular una metrica.
///
/// Cambia con cada `clear`, cada invalidacion por patron y cada
/// invalidacion de la metrica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
    global: u64,
    metric: u64,
}

#[derive(Debug)]
struct Generations {
    global: AtomicU64,
    per_metric: HashMap<MetricKind, AtomicU64>,
}

impl Generations {
    fn new() -> Self {
        Self {
            global: AtomicU64::new(0),
            per_metric: MetricKind::ALL
                .into_iter()
                .map(|metric| (metric, AtomicU64::new(0)))
                .collect(),
        }
    }

    fn current(&self, metric: MetricKind) -> Generation {
        Generation {
            global: self.global.load(Ordering::SeqCst),
            metric: self
                .per_metric
                .get(&metric)
                .map_or(0, |g| g.load(Ordering::SeqCst)),
        }
    }

    fn bump(&self, scope: Option<MetricKind>) {
        match scope.and_then(|metric| self.per_metric.get(&metric)) {
            Some(g) => g.fetch_add(1, Ordering::SeqCst),
            None => self.global.fetch_add(1, Ordering::SeqCst),
        };
    }
}

/// Expira cada entry segun su propio TTL, como limite de memoria para
/// keys que nadie vuelve a leer.
struct EntryExpiry;

impl Expiry<CacheKey, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Cache de metricas usando Moka.
/// Thread-safe y async-friendly.
///
/// La frescura se evalua con el `Clock` inyectado: una entry vencida se
/// considera ausente y se elimina en la siguiente lectura de su key.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use pipeline_core::{FilterSet, MetricKind, MetricWindow, SystemClock};
/// use pipeline_server::cache::{CacheConfig, MetricCache};
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = MetricCache::new(CacheConfig::default(), Arc::new(SystemClock));
///
/// if let Some(response) = cache.get(MetricKind::WinRate, &FilterSet::new(), MetricWindow::Rolling90d).await {
///     println!("Cache hit: {:?}", response.value);
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct MetricCache {
    inner: Cache<CacheKey, CacheEntry>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    generations: Arc<Generations>,
    metrics: CacheMetrics,
}

impl MetricCache {
    /// Crea un nuevo cache con la configuracion dada.
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let metrics = CacheMetrics::new();

        // Configurar listener para evictions
        let eviction_metrics = metrics.clone();
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryExpiry)
            .eviction_listener(move |_key, _value, cause| {
                let reason = match cause {
                    moka::notification::RemovalCause::Expired => "ttl",
                    moka::notification::RemovalCause::Size => "capacity",
                    moka::notification::RemovalCause::Explicit => "manual",
                    moka::notification::RemovalCause::Replaced => "replaced",
                };
                eviction_metrics.record_eviction(reason);
            })
            .build();

        Self {
            inner,
            default_ttl: config.default_ttl(),
            clock,
            generations: Arc::new(Generations::new()),
            metrics,
        }
    }

    /// Construye la key para el dia UTC actual.
    pub fn key_for(
        &self,
        metric: MetricKind,
        filters: &FilterSet,
        window: MetricWindow,
    ) -> CacheKey {
        CacheKey::new(metric, filters, window, self.clock.today())
    }

    /// Obtiene una respuesta fresca del cache si existe.
    ///
    /// Una entry vencida se elimina como efecto secundario y se reporta
    /// como ausente.
    pub async fn get(
        &self,
        metric: MetricKind,
        filters: &FilterSet,
        window: MetricWindow,
    ) -> Option<Arc<MetricResponse>> {
        let start = Instant::now();
        let key = self.key_for(metric, filters, window);

        let now = self.clock.now();

        let result = match self.inner.get(&key).await {
            Some(entry) if entry.is_fresh(now) => Some(entry.value),
            Some(_) => {
                self.evict_if_stale(&key, now).await;
                None
            },
            None => None,
        };

        if result.is_some() {
            self.metrics.record_hit();
        } else {
            self.metrics.record_miss();
        }

        self.metrics
            .record_operation_duration("get", start.elapsed());
        self.update_entry_gauge();

        result
    }

    /// Inserta una respuesta, reemplazando cualquier entry previa.
    ///
    /// Sin `ttl` se usa el TTL por defecto del cache. Retorna el valor tal
    /// como quedo almacenado.
    pub async fn set(
        &self,
        metric: MetricKind,
        filters: &FilterSet,
        window: MetricWindow,
        value: MetricResponse,
        ttl: Option<Duration>,
    ) -> Arc<MetricResponse> {
        let key = self.key_for(metric, filters, window);
        self.store(key, value, ttl).await
    }

    /// Como `set`, pero solo almacena si nada fue invalidado desde que se
    /// observo `generation`.
    ///
    /// Retorna el valor y si quedo almacenado.
    pub async fn set_if_current(
        &self,
        metric: MetricKind,
        filters: &FilterSet,
        window: MetricWindow,
        value: MetricResponse,
        ttl: Option<Duration>,
        generation: Generation,
    ) -> (Arc<MetricResponse>, bool) {
        if self.generation(metric) != generation {
            debug!(metric = %metric, "Cache invalidated during computation, result not stored");
            return (Arc::new(value), false);
        }

        let key = self.key_for(metric, filters, window);
        let value = self.store(key.clone(), value, ttl).await;

        // Una invalidacion pudo llegar durante el insert
        if self.generation(metric) != generation {
            debug!(key = %key, "Cache invalidated during insert, result dropped");
            self.inner.invalidate(&key).await;
            self.update_entry_gauge();
            return (value, false);
        }

        (value, true)
    }

    /// Generacion actual para `metric`.
    pub fn generation(&self, metric: MetricKind) -> Generation {
        self.generations.current(metric)
    }

    /// Marca una invalidacion: de una metrica, o de todo con `None`.
    ///
    /// Debe llamarse antes de eliminar las entries.
    pub(crate) fn bump_generation(&self, scope: Option<MetricKind>) {
        self.generations.bump(scope);
    }

    async fn store(
        &self,
        key: CacheKey,
        value: MetricResponse,
        ttl: Option<Duration>,
    ) -> Arc<MetricResponse> {
        let start = Instant::now();
        let value = Arc::new(value);

        let entry = CacheEntry {
            value: Arc::clone(&value),
            stored_at: self.clock.now(),
            ttl: ttl.unwrap_or(self.default_ttl),
        };
        self.inner.insert(key, entry).await;

        self.metrics
            .record_operation_duration("set", start.elapsed());
        self.update_entry_gauge();

        value
    }

    /// Elimina la entry solo si sigue vencida; un `set` concurrente la
    /// conserva.
    async fn evict_if_stale(&self, key: &CacheKey, now: DateTime<Utc>) {
        let outcome = self
            .inner
            .entry_by_ref(key)
            .and_compute_with(|current| {
                let op = match current {
                    Some(entry) if !entry.value().is_fresh(now) => Op::Remove,
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        if matches!(outcome, CompResult::Removed(_)) {
            debug!(key = %key, "Stale cache entry evicted");
        }
    }

    /// Elimina todas las entradas. Retorna cuantas habia.
    pub async fn clear(&self) -> usize {
        self.bump_generation(None);
        let count = self.inner.iter().count();
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
        self.update_entry_gauge();
        count
    }

    /// Introspeccion de solo lectura.
    pub fn stats(&self) -> CacheStats {
        let mut keys: Vec<String> = self.inner.iter().map(|(key, _)| key.to_string()).collect();
        keys.sort_unstable();

        CacheStats {
            size: keys.len(),
            keys,
        }
    }

    /// Invalida una entrada especifica.
    pub async fn invalidate(&self, key: &CacheKey) {
        self.inner.invalidate(key).await;
    }

    /// Retorna el numero aproximado de entries en cache.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Itera sobre todas las entries del cache.
    /// Nota: Esta es una snapshot, entries pueden cambiar durante iteracion.
    pub fn iter(&self) -> impl Iterator<Item = (Arc<CacheKey>, CacheEntry)> + '_ {
        self.inner.iter()
    }

    /// TTL aplicado cuando `set` no recibe uno.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Actualiza el gauge de entry count.
    fn update_entry_gauge(&self) {
        self.metrics.update_entry_count(self.inner.entry_count());
    }

    /// Retorna las metricas para acceso externo.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}
