//! Bid record and portfolio types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a bid opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    /// Being estimated, not yet submitted.
    Open,
    /// Submitted and awaiting a decision.
    Submitted,
    Awarded,
    Lost,
    /// Dropped before a decision.
    Withdrawn,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Submitted => "submitted",
            Self::Awarded => "awarded",
            Self::Lost => "lost",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Returns true while the bid is still in the pipeline.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Open | Self::Submitted)
    }

    /// Returns true once the owner has decided.
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Awarded | Self::Lost)
    }
}

/// One bid opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidRecord {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Two-letter state code of the job site.
    pub state: String,

    /// Pipeline stage (e.g. "estimating", "bidding", "negotiation").
    pub stage: String,

    /// Set-aside program, if any (e.g. "8a", "sdvosb", "hubzone").
    #[serde(default)]
    pub set_aside: Option<String>,

    pub status: BidStatus,

    /// Bid amount in dollars.
    pub value: f64,

    pub submitted_on: NaiveDate,

    #[serde(default)]
    pub decided_on: Option<NaiveDate>,
}

impl BidRecord {
    /// Returns the record's value for a filter dimension.
    pub fn dimension(&self, key: &str) -> Option<&str> {
        match key {
            "state" => Some(&self.state),
            "stage" => Some(&self.stage),
            "set_aside" => self.set_aside.as_deref(),
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }

    /// Date that places a decided bid inside a window.
    ///
    /// Falls back to the submission date when the decision date is unknown.
    pub fn decision_date(&self) -> NaiveDate {
        self.decided_on.unwrap_or(self.submitted_on)
    }

    /// Days from submission to decision, when both are known.
    pub fn cycle_days(&self) -> Option<i64> {
        self.decided_on
            .map(|decided| (decided - self.submitted_on).num_days())
            .filter(|days| *days >= 0)
    }
}

/// Company-level figures that are not derived from bid records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioSettings {
    /// Annual work capacity in dollars.
    pub total_capacity: f64,
    /// Contracted work not yet built, in dollars.
    pub backlog_value: f64,
    /// Award goal for the fiscal year.
    pub annual_target: Option<f64>,
    /// First month of the fiscal year (1 = January).
    pub fiscal_year_start_month: u32,
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        Self {
            total_capacity: 0.0,
            backlog_value: 0.0,
            annual_target: None,
            fiscal_year_start_month: 10,
        }
    }
}
