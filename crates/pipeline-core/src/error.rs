//! Contract violation errors.
//!
//! Every variant describes a caller mistake: an unknown metric, an
//! unknown window or a malformed filter set. These are detected while
//! parsing a request, before the cache or any aggregate source is
//! touched, and are never retried or cached.
//!
//! # Example
//!
//! ```
//! use pipeline_core::{ContractError, MetricWindow};
//!
//! let err = "last_week".parse::<MetricWindow>().unwrap_err();
//! assert!(matches!(err, ContractError::UnknownWindow { .. }));
//! ```

use thiserror::Error;

/// A request that does not satisfy the metrics contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// The metric name is not part of the catalogue.
    #[error("unknown metric '{name}'")]
    UnknownMetric {
        /// The name that was requested
        name: String,
    },

    /// The window is not one of the enumerated windows.
    #[error("unknown window '{name}', expected one of: {expected}")]
    UnknownWindow {
        /// The window that was requested
        name: String,
        /// Comma separated list of accepted windows
        expected: String,
    },

    /// The filter key is not a supported dimension.
    #[error("unknown filter '{key}', expected one of: {expected}")]
    UnknownFilter {
        /// The filter key that was provided
        key: String,
        /// Comma separated list of accepted keys
        expected: String,
    },

    /// A filter was given without a value.
    #[error("filter '{key}' has an empty value")]
    EmptyFilterValue {
        /// The filter key with an empty value
        key: String,
    },

    /// A filter value contains characters that are not allowed.
    #[error("filter '{key}' has an invalid value: {reason}")]
    InvalidFilterValue {
        /// The filter key
        key: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl ContractError {
    /// Creates an UnknownMetric error.
    pub fn unknown_metric(name: impl Into<String>) -> Self {
        Self::UnknownMetric { name: name.into() }
    }

    /// Creates an InvalidFilterValue error.
    pub fn invalid_filter_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilterValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error concerns the filter set.
    pub fn is_filter_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownFilter { .. }
                | Self::EmptyFilterValue { .. }
                | Self::InvalidFilterValue { .. }
        )
    }
}

/// Type alias for Results with ContractError.
pub type Result<T> = std::result::Result<T, ContractError>;
