//! # Pipeline Sources
//!
//! Raw aggregate sources for the bid pipeline KPI service.
//!
//! The metrics engine never reads bid records directly. It asks an
//! [`AggregateSource`] for the aggregates behind one metric, filter set and
//! window, and derives the KPI from those.
//!
//! ## Features
//!
//! - Async trait-based source abstraction
//! - File-backed [`RecordSource`] reading bid records from YAML or JSON
//! - Fiscal-year aware window bounds
//! - In-memory [`StaticSource`] for demos and tests
//!
//! ## Example
//!
//! ```ignore
//! use pipeline_sources::{AggregateQuery, AggregateSource, PortfolioSettings, RecordSource};
//!
//! let source = RecordSource::open("bids.yaml", PortfolioSettings::default(), clock).await?;
//!
//! let query = AggregateQuery::new(MetricKind::WinRate, FilterSet::new(), MetricWindow::Rolling90d);
//! let aggregates = source.fetch_aggregates(&query).await?;
//! ```

pub mod error;
pub mod records;
pub mod source;
pub mod static_source;

// Re-exports
pub use error::SourceError;
pub use records::{BidRecord, BidStatus, PortfolioSettings, RecordSource};
pub use source::{AggregateQuery, AggregateSource, Aggregates};
pub use static_source::StaticSource;

// Re-export pipeline_core for consumers
pub use pipeline_core;
