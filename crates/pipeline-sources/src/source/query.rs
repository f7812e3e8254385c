//! Aggregate query types.

use pipeline_core::{FilterSet, MetricKind, MetricWindow};
use serde::{Deserialize, Serialize};

/// A request for the raw aggregates behind one metric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateQuery {
    metric: MetricKind,
    filters: FilterSet,
    window: MetricWindow,
}

impl AggregateQuery {
    /// Creates a new aggregate query.
    ///
    /// # Example
    ///
    /// ```
    /// use pipeline_core::{FilterSet, MetricKind, MetricWindow};
    /// use pipeline_sources::AggregateQuery;
    ///
    /// let query = AggregateQuery::new(MetricKind::WinRate, FilterSet::new(), MetricWindow::AllTime);
    /// assert_eq!(query.metric(), MetricKind::WinRate);
    /// assert_eq!(query.to_string(), "win_rate/all_time?{}");
    /// ```
    pub fn new(metric: MetricKind, filters: FilterSet, window: MetricWindow) -> Self {
        Self {
            metric,
            filters,
            window,
        }
    }

    /// Returns the metric the aggregates are for.
    pub fn metric(&self) -> MetricKind {
        self.metric
    }

    /// Returns the filter set.
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Returns the window.
    pub fn window(&self) -> MetricWindow {
        self.window
    }
}

impl std::fmt::Display for AggregateQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}?{}", self.metric, self.window, self.filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_filters() {
        let filters = FilterSet::from_pairs([("state", "TX")]).unwrap();
        let query = AggregateQuery::new(MetricKind::PipelineValue, filters, MetricWindow::FiscalYtd);
        assert_eq!(query.to_string(), r#"pipeline_value/fiscal_ytd?{"state":"tx"}"#);
    }

    #[test]
    fn test_accessors() {
        let query = AggregateQuery::new(
            MetricKind::ProjectsNeeded,
            FilterSet::new(),
            MetricWindow::CurrentMonth,
        );
        assert_eq!(query.metric(), MetricKind::ProjectsNeeded);
        assert_eq!(query.window(), MetricWindow::CurrentMonth);
        assert!(query.filters().is_empty());
    }
}
