//! Cache invalidation with pattern matching support.

use crate::cache::{CacheKey, MetricCache};
use glob::Pattern;
use pipeline_core::MetricKind;
use serde::Serialize;
use tracing::{debug, info};

/// Resultado de una operación de invalidación.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidationResult {
    /// Número de entries invalidadas.
    pub count: usize,
    /// Patrones aplicados.
    pub patterns: Vec<String>,
}

impl MetricCache {
    /// Invalida todas las entradas de una métrica, en cualquier ventana,
    /// filtro o día.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use pipeline_core::{MetricKind, SystemClock};
    /// # use pipeline_server::cache::{CacheConfig, MetricCache};
    /// # #[tokio::main]
    /// # async fn main() {
    /// # let cache = MetricCache::new(CacheConfig::default(), Arc::new(SystemClock));
    /// let result = cache.invalidate_metric(MetricKind::WinRate).await;
    /// println!("Invalidated {} entries", result.count);
    /// # }
    /// ```
    pub async fn invalidate_metric(&self, metric: MetricKind) -> InvalidationResult {
        let pattern_str = format!("{}:*", metric.as_str());
        self.invalidate_matching(&pattern_str, Some(metric)).await
    }

    /// Invalida entradas usando un patrón glob.
    ///
    /// El patrón se aplica sobre la forma `metric:window:filters:day`
    /// donde cada parte puede usar comodines:
    /// - `*`: coincide con cualquier secuencia de caracteres
    /// - `?`: coincide con un carácter
    ///
    /// Un patrón inválido no invalida nada.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use pipeline_core::SystemClock;
    /// # use pipeline_server::cache::{CacheConfig, MetricCache};
    /// # #[tokio::main]
    /// # async fn main() {
    /// # let cache = MetricCache::new(CacheConfig::default(), Arc::new(SystemClock));
    /// // Invalida todas las métricas del año fiscal
    /// let result = cache.invalidate_by_pattern("*:fiscal_ytd:*").await;
    ///
    /// // Invalida las entries de un día
    /// let result = cache.invalidate_by_pattern("*:2026-04-02").await;
    /// # }
    /// ```
    pub async fn invalidate_by_pattern(&self, pattern_str: &str) -> InvalidationResult {
        self.invalidate_matching(pattern_str, None).await
    }

    /// `scope` limita la generacion afectada a una metrica.
    async fn invalidate_matching(
        &self,
        pattern_str: &str,
        scope: Option<MetricKind>,
    ) -> InvalidationResult {
        let pattern = match Pattern::new(pattern_str) {
            Ok(p) => p,
            Err(e) => {
                debug!(pattern = %pattern_str, error = %e, "Invalid glob pattern");
                return InvalidationResult {
                    count: 0,
                    patterns: vec![pattern_str.to_string()],
                };
            },
        };

        // Los calculos en curso no deben almacenar resultados previos
        self.bump_generation(scope);

        let matched: Vec<CacheKey> = self
            .iter()
            .filter(|(key, _)| pattern.matches(&key.to_string()))
            .map(|(key, _)| (*key).clone())
            .collect();

        let count = matched.len();
        for key in matched {
            self.invalidate(&key).await;
        }

        info!(
            pattern = %pattern_str,
            count = count,
            "Cache entries invalidated by pattern"
        );

        InvalidationResult {
            count,
            patterns: vec![pattern_str.to_string()],
        }
    }

    /// Invalida múltiples patrones a la vez.
    pub async fn invalidate_by_patterns<S: AsRef<str>>(&self, patterns: &[S]) -> InvalidationResult {
        let mut total_count = 0;
        let mut all_patterns = Vec::with_capacity(patterns.len());

        for pattern_str in patterns {
            let result = self.invalidate_by_pattern(pattern_str.as_ref()).await;
            total_count += result.count;
            all_patterns.extend(result.patterns);
        }

        InvalidationResult {
            count: total_count,
            patterns: all_patterns,
        }
    }
}
