//! Engine error types.

use pipeline_core::ContractError;
use pipeline_sources::SourceError;

/// Errors surfaced by [`MetricsEngine`](super::MetricsEngine).
///
/// Degenerate data is not an error: it comes back as a response with a
/// null value.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The aggregate source failed. Nothing was cached.
    #[error("upstream failure: {0}")]
    Upstream(#[from] SourceError),

    /// The request violated the metric contract.
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl EngineError {
    /// Returns true if retrying later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Upstream(e) => e.is_transient(),
            Self::Contract(_) => false,
        }
    }
}
