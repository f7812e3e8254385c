//! Record-backed aggregate source.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use pipeline_core::Clock;
use tracing::{debug, info};

use super::aggregate::aggregate;
use super::loader::load_records;
use super::model::{BidRecord, PortfolioSettings};
use crate::error::SourceError;
use crate::source::{AggregateQuery, AggregateSource, Aggregates};

/// Source name used as provenance label.
const SOURCE_NAME: &str = "bid_records";

/// Aggregates bid records held in memory.
///
/// Records come from a YAML or JSON file (see [`RecordSource::open`]) or
/// are handed over directly. File-backed sources can be reloaded with
/// [`AggregateSource::refresh`]; in-flight queries keep the snapshot they
/// started with.
pub struct RecordSource {
    path: Option<PathBuf>,
    portfolio: PortfolioSettings,
    clock: Arc<dyn Clock>,
    records: RwLock<Arc<Vec<BidRecord>>>,
}

impl RecordSource {
    /// Loads records from a file.
    pub async fn open(
        path: impl AsRef<Path>,
        portfolio: PortfolioSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let records = load_records(&path).await?;

        info!(path = %path.display(), count = records.len(), "Bid records loaded");

        Ok(Self {
            path: Some(path),
            portfolio,
            clock,
            records: RwLock::new(Arc::new(records)),
        })
    }

    /// Wraps records that are already in memory.
    pub fn from_records(
        records: Vec<BidRecord>,
        portfolio: PortfolioSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            path: None,
            portfolio,
            clock,
            records: RwLock::new(Arc::new(records)),
        }
    }

    /// Returns the number of records currently loaded.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the portfolio settings.
    pub fn portfolio(&self) -> &PortfolioSettings {
        &self.portfolio
    }

    fn snapshot(&self) -> Arc<Vec<BidRecord>> {
        Arc::clone(&self.records.read())
    }
}

#[async_trait]
impl AggregateSource for RecordSource {
    async fn fetch_aggregates(&self, query: &AggregateQuery) -> Result<Aggregates, SourceError> {
        let records = self.snapshot();
        let today = self.clock.today();

        let result = aggregate(&records, query, &self.portfolio, today);

        debug!(
            query = %query,
            samples = result.samples,
            "Aggregates computed"
        );

        Ok(result)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if tokio::fs::try_exists(path).await? {
            Ok(())
        } else {
            Err(SourceError::unavailable(format!(
                "record file {} is missing",
                path.display()
            )))
        }
    }

    async fn refresh(&self) -> Result<(), SourceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let records = load_records(path).await?;
        let count = records.len();
        *self.records.write() = Arc::new(records);

        info!(path = %path.display(), count = count, "Bid records reloaded");
        Ok(())
    }

    fn supports_refresh(&self) -> bool {
        self.path.is_some()
    }
}
