//! File-backed bid record source.

mod aggregate;
mod loader;
mod model;
mod source;
pub mod window;

pub use aggregate::aggregate;
pub use loader::{RecordFormat, load_records, parse_records};
pub use model::{BidRecord, BidStatus, PortfolioSettings};
pub use source::RecordSource;
pub use window::WindowBounds;
