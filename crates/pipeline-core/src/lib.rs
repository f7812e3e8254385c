//! Pipeline Core - Domain types for the bid pipeline KPI service
//!
//! This crate provides the vocabulary shared by the aggregate sources and
//! the metrics server: metric identifiers, windows, filter sets, the
//! response envelope and the clock abstraction.

pub mod clock;
pub mod error;
pub mod filter;
pub mod response;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ContractError, Result};
pub use filter::{FILTER_KEYS, FilterSet};
pub use response::{INSUFFICIENT_SAMPLES, MetricResponse, Params};
pub use types::{MetricKind, MetricWindow};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
