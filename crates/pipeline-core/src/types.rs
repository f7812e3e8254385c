//! Metric and window identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ContractError;

/// A KPI in the metrics catalogue.
///
/// Each metric carries its own derivation floor (the minimum number of
/// underlying samples required before a numeric value is reported) and an
/// optional TTL that overrides the cache default.
///
/// # Example
///
/// ```
/// use pipeline_core::MetricKind;
///
/// let metric: MetricKind = "win_rate".parse().unwrap();
/// assert_eq!(metric, MetricKind::WinRate);
/// assert_eq!(metric.as_str(), "win_rate");
/// assert_eq!(metric.min_samples(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    AwardedYtd,
    PipelineValue,
    MonthlyAwardPace,
    ProjectedFyEnd,
    ProjectsNeeded,
    WinRate,
    AvgPipelineVelocity,
    CapacityIfAllBidsWin,
}

impl MetricKind {
    /// Every metric, in dashboard order.
    pub const ALL: [MetricKind; 8] = [
        MetricKind::AwardedYtd,
        MetricKind::PipelineValue,
        MetricKind::MonthlyAwardPace,
        MetricKind::ProjectedFyEnd,
        MetricKind::ProjectsNeeded,
        MetricKind::WinRate,
        MetricKind::AvgPipelineVelocity,
        MetricKind::CapacityIfAllBidsWin,
    ];

    /// Returns the wire name of the metric.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwardedYtd => "awarded_ytd",
            Self::PipelineValue => "pipeline_value",
            Self::MonthlyAwardPace => "monthly_award_pace",
            Self::ProjectedFyEnd => "projected_fy_end",
            Self::ProjectsNeeded => "projects_needed",
            Self::WinRate => "win_rate",
            Self::AvgPipelineVelocity => "avg_pipeline_velocity",
            Self::CapacityIfAllBidsWin => "capacity_if_all_bids_win",
        }
    }

    /// Minimum sample count below which the value is suppressed.
    pub fn min_samples(&self) -> u64 {
        match self {
            Self::AwardedYtd | Self::PipelineValue | Self::CapacityIfAllBidsWin => 0,
            Self::MonthlyAwardPace | Self::ProjectedFyEnd | Self::ProjectsNeeded => 1,
            Self::AvgPipelineVelocity => 3,
            Self::WinRate => 5,
        }
    }

    /// Metric-specific TTL, if the metric does not use the cache default.
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Self::AvgPipelineVelocity => Some(Duration::from_secs(15 * 60)),
            _ => None,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ContractError::unknown_metric(s))
    }
}

/// Time range a metric is computed over.
///
/// # Example
///
/// ```
/// use pipeline_core::MetricWindow;
///
/// let window: MetricWindow = "fiscal_ytd".parse().unwrap();
/// assert_eq!(window, MetricWindow::FiscalYtd);
/// assert!("ytd".parse::<MetricWindow>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricWindow {
    /// The last 90 days, inclusive of today.
    #[default]
    #[serde(rename = "rolling_90d")]
    Rolling90d,
    /// From the first day of the fiscal year to today.
    FiscalYtd,
    /// From the first day of the calendar month to today.
    CurrentMonth,
    /// Every record on file.
    AllTime,
}

impl MetricWindow {
    /// Every window, in display order.
    pub const ALL: [MetricWindow; 4] = [
        MetricWindow::Rolling90d,
        MetricWindow::FiscalYtd,
        MetricWindow::CurrentMonth,
        MetricWindow::AllTime,
    ];

    /// Returns the wire name of the window.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rolling90d => "rolling_90d",
            Self::FiscalYtd => "fiscal_ytd",
            Self::CurrentMonth => "current_month",
            Self::AllTime => "all_time",
        }
    }

    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|w| w.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MetricWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricWindow {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| ContractError::UnknownWindow {
                name: s.to_string(),
                expected: Self::expected(),
            })
    }
}
