//! Partitioning of transactions into labeled chart buckets.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use super::period::{DateRange, Period};
use crate::clock::Clock;
use crate::models::Transaction;

/// Width of a bucket in the month view, in days.
const MONTH_BUCKET_DAYS: u32 = 5;

/// Chart data for one period: one label and one expense/income total per
/// bucket. All three vectors always have the period's bucket count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Bucket labels, oldest first.
    pub labels: Vec<String>,
    /// Expense totals per bucket.
    pub expense_series: Vec<f64>,
    /// Income and salary totals per bucket.
    pub income_series: Vec<f64>,
}

impl ChartSeries {
    /// Sum of all expense buckets.
    #[must_use]
    pub fn total_expense(&self) -> f64 {
        self.expense_series.iter().sum()
    }

    /// Sum of all income buckets.
    #[must_use]
    pub fn total_income(&self) -> f64 {
        self.income_series.iter().sum()
    }
}

/// How a period's window is cut into buckets.
#[derive(Debug, Clone, Copy)]
enum Layout {
    /// One bucket per day, labeled `MM/DD`.
    Daily,
    /// Five-day buckets, labeled `DD-DD` or `DD/MM-DD/MM`.
    FiveDay,
    /// One bucket per calendar month, labeled `YYYY/MM`.
    Monthly,
}

impl Layout {
    /// Layout used by `period`.
    const fn of(period: Period) -> Self {
        match period {
            Period::Week => Self::Daily,
            Period::Month => Self::FiveDay,
            Period::Quarter | Period::Year | Period::All => Self::Monthly,
        }
    }

    /// Bucket index of `date`, counted from `start`.
    fn index(self, start: NaiveDate, date: NaiveDate) -> Option<usize> {
        let offset = match self {
            Self::Daily => (date - start).num_days(),
            Self::FiveDay => (date - start)
                .num_days()
                .div_euclid(i64::from(MONTH_BUCKET_DAYS)),
            Self::Monthly => {
                i64::from(date.year() - start.year()) * 12 + i64::from(date.month())
                    - i64::from(start.month())
            }
        };
        usize::try_from(offset).ok()
    }

    /// Label of bucket `index`.
    fn label(self, start: NaiveDate, index: usize) -> String {
        match self {
            Self::Daily => add_days(start, index).format("%m/%d").to_string(),
            Self::FiveDay => {
                let width = u64::from(MONTH_BUCKET_DAYS);
                let offset = u64::try_from(index).unwrap_or(u64::MAX).saturating_mul(width);
                let first = date_plus(start, offset);
                let last = date_plus(first, width - 1);
                if first.month() == last.month() {
                    format!("{}-{}", first.format("%d"), last.format("%d"))
                } else {
                    format!("{}-{}", first.format("%d/%m"), last.format("%d/%m"))
                }
            }
            Self::Monthly => {
                let months = u32::try_from(index).unwrap_or(u32::MAX);
                start
                    .checked_add_months(Months::new(months))
                    .map_or_else(String::new, |month| month.format("%Y/%m").to_string())
            }
        }
    }
}

/// `date` plus `days`, saturating at the latest representable date.
fn date_plus(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// `date` plus a bucket offset in days.
fn add_days(date: NaiveDate, days: usize) -> NaiveDate {
    date_plus(date, u64::try_from(days).unwrap_or(u64::MAX))
}

/// Sums transaction amounts into the chart buckets of `period`.
///
/// Expenses go to `expense_series`; income and salary go to
/// `income_series`. Transactions outside the period's chart window, dated
/// in the future, or with unparseable dates contribute nothing.
#[must_use]
pub fn bucket_transactions(
    transactions: &[Transaction],
    period: Period,
    clock: &dyn Clock,
) -> ChartSeries {
    bucket_in_window(transactions, period, period.chart_window(clock.today()))
}

/// Buckets `transactions` over an explicit window.
fn bucket_in_window(transactions: &[Transaction], period: Period, window: DateRange) -> ChartSeries {
    let count = period.bucket_count();
    let layout = Layout::of(period);
    let mut expense_series = vec![0.0_f64; count];
    let mut income_series = vec![0.0_f64; count];

    for tx in transactions {
        let Some(date) = tx.parsed_date().filter(|&day| window.contains(day)) else {
            continue;
        };
        let series = if tx.kind.is_expense() {
            &mut expense_series
        } else {
            &mut income_series
        };
        if let Some(slot) = layout
            .index(window.start, date)
            .and_then(|index| series.get_mut(index))
        {
            *slot += tx.amount;
        }
    }

    let labels = (0..count)
        .map(|index| layout.label(window.start, index))
        .collect();
    tracing::trace!(%period, buckets = count, "transactions bucketed");

    ChartSeries {
        labels,
        expense_series,
        income_series,
    }
}
