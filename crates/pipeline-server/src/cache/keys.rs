//! Cache key generation.

use chrono::NaiveDate;
use pipeline_core::{FilterSet, MetricKind, MetricWindow};
use std::fmt;

/// Key unica para cache de metricas.
///
/// Combina metrica, ventana, filtros canonicos y dia UTC. El dia forma
/// parte de la key, asi que un proceso de larga vida nunca sirve el
/// snapshot de ayer despues de medianoche UTC.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    metric: MetricKind,
    window: MetricWindow,
    filters: String,
    day: NaiveDate,
}

impl CacheKey {
    /// Crea una nueva cache key.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use pipeline_core::{FilterSet, MetricKind, MetricWindow};
    /// use pipeline_server::cache::CacheKey;
    ///
    /// let day = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
    /// let key = CacheKey::new(MetricKind::WinRate, &FilterSet::new(), MetricWindow::Rolling90d, day);
    /// assert_eq!(key.to_string(), "win_rate:rolling_90d:{}:2026-02-03");
    /// ```
    pub fn new(
        metric: MetricKind,
        filters: &FilterSet,
        window: MetricWindow,
        day: NaiveDate,
    ) -> Self {
        Self {
            metric,
            window,
            filters: filters.canonical(),
            day,
        }
    }

    /// Retorna la metrica.
    pub fn metric(&self) -> MetricKind {
        self.metric
    }

    /// Retorna la ventana.
    pub fn window(&self) -> MetricWindow {
        self.window
    }

    /// Retorna la serializacion canonica de los filtros.
    pub fn filters(&self) -> &str {
        &self.filters
    }

    /// Retorna el dia UTC.
    pub fn day(&self) -> NaiveDate {
        self.day
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.metric,
            self.window,
            self.filters,
            self.day.format("%Y-%m-%d")
        )
    }
}
