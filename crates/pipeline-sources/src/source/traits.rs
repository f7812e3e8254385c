//! Aggregate source trait definition.

use async_trait::async_trait;

use super::{AggregateQuery, Aggregates};
use crate::error::SourceError;

/// A source of raw metric aggregates.
///
/// This trait abstracts over where bid data lives (a record file, a
/// database view, a remote API), so the metrics engine can derive KPIs
/// without knowing the underlying storage.
///
/// # Implementors
///
/// - `RecordSource` - Aggregates bid records loaded from a YAML/JSON file
/// - `StaticSource` - Returns fixed aggregates (demos and tests)
#[async_trait]
pub trait AggregateSource: Send + Sync {
    /// Fetches the aggregates for the given query.
    ///
    /// # Errors
    ///
    /// - `SourceError::Unavailable` if the source is not accessible
    /// - `SourceError::Timeout` if the source did not answer in time
    async fn fetch_aggregates(&self, query: &AggregateQuery) -> Result<Aggregates, SourceError>;

    /// Returns the name of this source.
    ///
    /// Used as the provenance label of every metric derived from it.
    fn name(&self) -> &str;

    /// Performs a health check on the source.
    async fn health_check(&self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Reloads the underlying data.
    ///
    /// The default implementation is a no-op for sources that don't support refresh.
    async fn refresh(&self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Returns whether this source supports refresh operations.
    fn supports_refresh(&self) -> bool {
        false
    }
}
