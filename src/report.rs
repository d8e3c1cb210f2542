//! Reports engine: period chart, category breakdown and insight cards.
//!
//! Each stage is a pure function over an immutable slice of
//! [`Transaction`]s, and everything is recomputed from scratch on every
//! call:
//!
//! * [`bucket_transactions`] sums amounts into the chart buckets of a
//!   [`Period`],
//! * [`aggregate_by_category`] rolls expenses up per category,
//! * [`generate_insights`] turns both into insight cards.
//!
//! [`Report::build`] runs the whole pipeline for one period.

mod aggregate;
mod buckets;
mod insights;
mod period;
pub mod sample;

pub use aggregate::{CategoryAggregate, aggregate_by_category, aggregate_by_category_with};
pub use buckets::{ChartSeries, bucket_transactions};
pub use insights::{Insight, PeriodSummary, Severity, generate_insights};
pub use period::{DateRange, Period};

use serde::Serialize;

use crate::category::CategoryTables;
use crate::clock::Clock;
use crate::models::{MonthComparison, Transaction};

/// Rounds a percentage to a whole number; negatives and non-finite values
/// become zero.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is finite, non-negative and rounded before the cast"
)]
pub(crate) fn whole_percent(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

/// Inputs that shape a report besides the transactions themselves.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Category lists used to resolve numeric references.
    pub tables: CategoryTables,
    /// Month-over-month comparison from the service summary.
    pub comparison: Option<MonthComparison>,
}

/// Everything the reports screen shows for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Selected period.
    pub period: Period,
    /// Range the category breakdown and insights cover.
    pub range: DateRange,
    /// Period chart.
    pub chart: ChartSeries,
    /// Expense breakdown, largest first.
    pub categories: Vec<CategoryAggregate>,
    /// Totals of the period.
    pub summary: PeriodSummary,
    /// Insight cards.
    pub insights: Vec<Insight>,
}

impl Report {
    /// Builds a report with the built-in category tables.
    #[must_use]
    pub fn build(transactions: &[Transaction], period: Period, clock: &dyn Clock) -> Self {
        Self::build_with(transactions, period, clock, &ReportOptions::default())
    }

    /// Builds a report for `period` as of `clock`'s today.
    ///
    /// The chart covers the period's chart window. The category breakdown,
    /// totals and insights cover the transactions dated within the
    /// period's query range; transactions with unparseable dates are left
    /// out of both.
    #[tracing::instrument(skip_all, fields(period = %period, transactions = transactions.len()))]
    #[must_use]
    pub fn build_with(
        transactions: &[Transaction],
        period: Period,
        clock: &dyn Clock,
        options: &ReportOptions,
    ) -> Self {
        let range = period.query_range(clock.today());
        let in_range: Vec<Transaction> = transactions
            .iter()
            .filter(|tx| tx.parsed_date().is_some_and(|date| range.contains(date)))
            .cloned()
            .collect();

        let chart = bucket_transactions(transactions, period, clock);
        let categories = aggregate_by_category_with(&in_range, &options.tables);
        let summary =
            PeriodSummary::from_transactions(&in_range).with_comparison(options.comparison.clone());
        let insights = generate_insights(&in_range, &categories, &summary);
        tracing::debug!(
            in_range = in_range.len(),
            categories = categories.len(),
            insights = insights.len(),
            "report built"
        );

        Self {
            period,
            range,
            chart,
            categories,
            summary,
            insights,
        }
    }
}
