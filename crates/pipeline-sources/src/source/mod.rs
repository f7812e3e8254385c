//! Aggregate source abstraction.

mod aggregates;
mod query;
mod traits;

pub use aggregates::Aggregates;
pub use query::AggregateQuery;
pub use traits::AggregateSource;
