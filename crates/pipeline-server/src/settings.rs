//! Layered service configuration.
//!
//! Precedence, lowest first: built-in defaults, the optional settings file,
//! then `PIPELINE_*` environment variables (`__` separates nested keys, e.g.
//! `PIPELINE_SERVER__PORT=9000`).

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use config::{Config, Environment, File};
use pipeline_core::MetricKind;
use pipeline_sources::PortfolioSettings;
use serde::Deserialize;

use crate::cache::CacheConfig;

/// Variable naming the settings file.
pub const CONFIG_PATH_ENV: &str = "PIPELINE_CONFIG";

/// Settings file used when `PIPELINE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "pipeline.yaml";

const ENV_PREFIX: &str = "PIPELINE";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("unknown metric '{0}' in cache.metric_ttl_seconds")]
    UnknownMetric(String),

    #[error("{key} must be greater than zero")]
    ZeroTtl { key: String },

    #[error("data.fiscal_year_start_month must be 1..=12, got {0}")]
    FiscalMonth(u32),

    #[error("invalid listen address '{0}'")]
    Address(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub data: DataSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub ttl_seconds: u64,
    pub max_capacity: u64,
    /// Per-metric TTL, keyed by metric name.
    #[serde(default)]
    pub metric_ttl_seconds: HashMap<String, u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    pub records_path: PathBuf,
    pub fiscal_year_start_month: u32,
    pub total_capacity: f64,
    pub backlog_value: f64,
    #[serde(default)]
    pub annual_target: Option<f64>,
}

impl Settings {
    /// Loads settings from `PIPELINE_CONFIG` (or `pipeline.yaml`) and the
    /// process environment.
    pub fn load() -> Result<Self, SettingsError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_with(Some(&path), Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads settings from an explicit file and environment source.
    ///
    /// A missing file is not an error. Tests pass an `Environment` built
    /// with [`Settings::environment`] to avoid touching the real process
    /// environment.
    pub fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("cache.ttl_seconds", 600)?
            .set_default("cache.max_capacity", 10_000)?
            .set_default("data.records_path", "data/bids.yaml")?
            .set_default("data.fiscal_year_start_month", 10)?
            .set_default("data.total_capacity", 0.0)?
            .set_default("data.backlog_value", 0.0)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings: Settings = builder
            .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Environment source backed by a fixed map instead of the process.
    pub fn environment<I, K, V>(vars: I) -> Environment
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.cache.ttl_seconds == 0 {
            return Err(SettingsError::ZeroTtl {
                key: "cache.ttl_seconds".to_string(),
            });
        }

        self.ttl_overrides()?;

        let month = self.data.fiscal_year_start_month;
        if !(1..=12).contains(&month) {
            return Err(SettingsError::FiscalMonth(month));
        }

        self.addr()?;
        Ok(())
    }

    pub fn addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = format!("{}:{}", self.server.host, self.server.port);
        raw.parse().map_err(|_| SettingsError::Address(raw))
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl_seconds: self.cache.ttl_seconds,
            max_capacity: self.cache.max_capacity,
        }
    }

    /// Per-metric TTLs with names resolved.
    pub fn ttl_overrides(&self) -> Result<HashMap<MetricKind, Duration>, SettingsError> {
        self.cache
            .metric_ttl_seconds
            .iter()
            .map(|(name, secs)| {
                let metric = MetricKind::from_str(name)
                    .map_err(|_| SettingsError::UnknownMetric(name.clone()))?;
                if *secs == 0 {
                    return Err(SettingsError::ZeroTtl {
                        key: format!("cache.metric_ttl_seconds.{name}"),
                    });
                }
                Ok((metric, Duration::from_secs(*secs)))
            })
            .collect()
    }

    pub fn portfolio(&self) -> PortfolioSettings {
        PortfolioSettings {
            total_capacity: self.data.total_capacity,
            backlog_value: self.data.backlog_value,
            annual_target: self.data.annual_target,
            fiscal_year_start_month: self.data.fiscal_year_start_month,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env() -> Environment {
        Settings::environment(Vec::<(String, String)>::new())
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_with(None, no_env()).unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.cache.ttl_seconds, 600);
        assert_eq!(settings.cache.max_capacity, 10_000);
        assert_eq!(settings.data.fiscal_year_start_month, 10);
        assert_eq!(settings.data.annual_target, None);
        assert!(settings.ttl_overrides().unwrap().is_empty());
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            r#"
server:
  port: 9100
cache:
  ttl_seconds: 300
  metric_ttl_seconds:
    win_rate: 120
data:
  records_path: /srv/bids.json
  annual_target: 25000000
"#
        )
        .unwrap();

        let env = Settings::environment([("PIPELINE_SERVER__PORT", "9200")]);
        let settings = Settings::load_with(Some(file.path()), env).unwrap();

        assert_eq!(settings.server.port, 9200);
        assert_eq!(settings.cache.ttl_seconds, 300);
        assert_eq!(settings.data.records_path, PathBuf::from("/srv/bids.json"));
        assert_eq!(settings.portfolio().annual_target, Some(25_000_000.0));
        assert_eq!(
            settings.ttl_overrides().unwrap()[&MetricKind::WinRate],
            Duration::from_secs(120)
        );
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let settings =
            Settings::load_with(Some(Path::new("/nonexistent/pipeline.yaml")), no_env()).unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
    }

    #[test]
    fn test_rejects_unknown_metric() {
        let env = Settings::environment([("PIPELINE_CACHE__METRIC_TTL_SECONDS__CONVERSION", "60")]);
        let err = Settings::load_with(None, env).unwrap_err();
        assert!(matches!(err, SettingsError::UnknownMetric(name) if name == "conversion"));
    }

    #[test]
    fn test_rejects_zero_ttl_and_bad_month() {
        let env = Settings::environment([("PIPELINE_CACHE__TTL_SECONDS", "0")]);
        assert!(matches!(
            Settings::load_with(None, env),
            Err(SettingsError::ZeroTtl { .. })
        ));

        let env = Settings::environment([("PIPELINE_DATA__FISCAL_YEAR_START_MONTH", "13")]);
        assert!(matches!(
            Settings::load_with(None, env),
            Err(SettingsError::FiscalMonth(13))
        ));
    }
}
