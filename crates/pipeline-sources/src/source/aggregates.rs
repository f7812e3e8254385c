//! Raw aggregate payload.

use serde::{Deserialize, Serialize};

/// Raw aggregates for one metric query.
///
/// Counts and sums are already narrowed by the query's filter set. Award
/// and loss figures are also narrowed by the window, the open pipeline is
/// a point-in-time snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aggregates {
    /// Records that contributed to any figure below.
    pub samples: u64,
    /// Bids awarded inside the window.
    pub awards: u64,
    /// Bids lost inside the window.
    pub losses: u64,
    /// Total contract value of the awards.
    pub awarded_value: f64,
    /// Bids still open or awaiting a decision.
    pub open_bids: u64,
    /// Total value of the open bids.
    pub pipeline_value: f64,
    /// Contracted work not yet built.
    pub backlog_value: f64,
    /// Annual bonding/production capacity.
    pub total_capacity: f64,
    /// Award goal for the fiscal year, if one is configured.
    pub annual_target: Option<f64>,
    /// Length of the window in months.
    pub months_elapsed: f64,
    /// Months left until the fiscal year closes.
    pub months_remaining: f64,
    /// Sum of submission-to-decision days over decided bids.
    pub total_cycle_days: f64,
    /// Decided bids with both dates known.
    pub cycle_samples: u64,
    /// The source itself declares the value underivable.
    pub upstream_null: bool,
    /// Explanation supplied with `upstream_null`.
    pub upstream_reason: Option<String>,
}

impl Aggregates {
    /// Aggregates carrying only award/loss decisions.
    ///
    /// # Example
    ///
    /// ```
    /// use pipeline_sources::Aggregates;
    ///
    /// let agg = Aggregates::decisions(8, 2);
    /// assert_eq!(agg.samples, 10);
    /// ```
    pub fn decisions(awards: u64, losses: u64) -> Self {
        Self {
            samples: awards.saturating_add(losses),
            awards,
            losses,
            ..Self::default()
        }
    }

    /// Marks the aggregates as authoritatively underivable.
    pub fn with_upstream_null(mut self, reason: Option<String>) -> Self {
        self.upstream_null = true;
        self.upstream_reason = reason;
        self
    }
}
