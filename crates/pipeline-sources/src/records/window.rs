//! Calendar bounds of metric windows.

use chrono::{Datelike, Days, Months, NaiveDate};
use pipeline_core::MetricWindow;

/// Average month length used to turn day spans into months.
pub const DAYS_PER_MONTH: f64 = 30.4375;

/// Length of the rolling window in days.
const ROLLING_DAYS: u64 = 90;

/// Inclusive date range covered by a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    /// First day inside the window. `None` means the window is empty.
    pub start: Option<NaiveDate>,
    /// Last day inside the window (today).
    pub end: NaiveDate,
}

impl WindowBounds {
    /// Resolves a window relative to `today`.
    ///
    /// `earliest` is the first date on file and only matters for
    /// [`MetricWindow::AllTime`].
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use pipeline_core::MetricWindow;
    /// use pipeline_sources::records::WindowBounds;
    ///
    /// let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
    /// let bounds = WindowBounds::resolve(MetricWindow::CurrentMonth, today, 10, None);
    /// assert_eq!(bounds.start, NaiveDate::from_ymd_opt(2026, 3, 1));
    /// ```
    pub fn resolve(
        window: MetricWindow,
        today: NaiveDate,
        fiscal_start_month: u32,
        earliest: Option<NaiveDate>,
    ) -> Self {
        let start = match window {
            MetricWindow::Rolling90d => today.checked_sub_days(Days::new(ROLLING_DAYS)),
            MetricWindow::FiscalYtd => fiscal_year_start(today, fiscal_start_month),
            MetricWindow::CurrentMonth => today.with_day(1),
            MetricWindow::AllTime => earliest.map(|d| d.min(today)),
        };

        Self { start, end: today }
    }

    /// Returns true if the date falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.start {
            Some(start) => date >= start && date <= self.end,
            None => false,
        }
    }

    /// Number of days covered, inclusive of both ends.
    pub fn days(&self) -> i64 {
        self.start
            .map(|start| (self.end - start).num_days() + 1)
            .unwrap_or(0)
    }

    /// Length of the window in months.
    pub fn months(&self) -> f64 {
        self.days() as f64 / DAYS_PER_MONTH
    }
}

/// First day of the fiscal year containing `today`.
pub fn fiscal_year_start(today: NaiveDate, start_month: u32) -> Option<NaiveDate> {
    let year = if today.month() >= start_month {
        today.year()
    } else {
        today.year() - 1
    };
    NaiveDate::from_ymd_opt(year, start_month, 1)
}

/// Last day of the fiscal year containing `today`.
pub fn fiscal_year_end(today: NaiveDate, start_month: u32) -> Option<NaiveDate> {
    fiscal_year_start(today, start_month)?
        .checked_add_months(Months::new(12))?
        .checked_sub_days(Days::new(1))
}

/// Months from `today` until the fiscal year closes.
pub fn months_remaining(today: NaiveDate, start_month: u32) -> f64 {
    fiscal_year_end(today, start_month)
        .map(|end| (end - today).num_days().max(0) as f64 / DAYS_PER_MONTH)
        .unwrap_or(0.0)
}
