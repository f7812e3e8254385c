//! Aggregation of bid records into metric inputs.

use chrono::NaiveDate;
use pipeline_core::FilterSet;

use super::model::{BidRecord, BidStatus, PortfolioSettings};
use super::window::{WindowBounds, months_remaining};
use crate::source::{AggregateQuery, Aggregates};

/// Computes the aggregates for a query over a slice of records.
///
/// Decisions (awards and losses) count when their decision date falls
/// inside the window. Pending bids form the pipeline regardless of the
/// window. Withdrawn bids never count.
pub fn aggregate(
    records: &[BidRecord],
    query: &AggregateQuery,
    portfolio: &PortfolioSettings,
    today: NaiveDate,
) -> Aggregates {
    let matching: Vec<&BidRecord> = records
        .iter()
        .filter(|r| matches_filters(r, query.filters()))
        .collect();

    let earliest = matching.iter().map(|r| r.submitted_on).min();
    let bounds = WindowBounds::resolve(
        query.window(),
        today,
        portfolio.fiscal_year_start_month,
        earliest,
    );

    let mut agg = Aggregates {
        backlog_value: portfolio.backlog_value,
        total_capacity: portfolio.total_capacity,
        annual_target: portfolio.annual_target,
        months_elapsed: bounds.months(),
        months_remaining: months_remaining(today, portfolio.fiscal_year_start_month),
        ..Aggregates::default()
    };

    for record in matching {
        match record.status {
            BidStatus::Open | BidStatus::Submitted => {
                agg.samples += 1;
                agg.open_bids += 1;
                agg.pipeline_value += record.value;
            },
            BidStatus::Awarded | BidStatus::Lost => {
                if !bounds.contains(record.decision_date()) {
                    continue;
                }

                agg.samples += 1;
                if record.status == BidStatus::Awarded {
                    agg.awards += 1;
                    agg.awarded_value += record.value;
                } else {
                    agg.losses += 1;
                }

                if let Some(days) = record.cycle_days() {
                    agg.total_cycle_days += days as f64;
                    agg.cycle_samples += 1;
                }
            },
            BidStatus::Withdrawn => {},
        }
    }

    agg
}

/// Returns true if the record satisfies every constraint in the set.
fn matches_filters(record: &BidRecord, filters: &FilterSet) -> bool {
    filters.iter().all(|(key, expected)| {
        record
            .dimension(key)
            .is_some_and(|actual| actual.trim().to_lowercase() == expected)
    })
}
