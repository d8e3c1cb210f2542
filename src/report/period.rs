//! Reporting period selector and the date ranges derived from it.

use core::fmt;
use core::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::ParseEnumError;

/// Reporting window chosen by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The last 7 days, one bucket per day.
    Week,
    /// The last 30 days, six 5-day buckets.
    #[default]
    Month,
    /// The current month and the two before it.
    Quarter,
    /// January to December of the current year.
    Year,
    /// The current month and the 23 before it.
    All,
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day in the range.
    pub start: NaiveDate,
    /// Last day in the range.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range from `start` to `end`, both inclusive.
    #[inline]
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns `true` if `date` lies within the range.
    #[inline]
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Period {
    /// All periods, in selector order.
    pub const ALL: [Self; 5] = [Self::Week, Self::Month, Self::Quarter, Self::Year, Self::All];

    /// Selector name (`week`, `month`, ...).
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
            Self::All => "all",
        }
    }

    /// Number of chart buckets for this period.
    #[inline]
    #[must_use]
    pub const fn bucket_count(self) -> usize {
        match self {
            Self::Week => 7,
            Self::Month => 6,
            Self::Quarter => 3,
            Self::Year => 12,
            Self::All => 24,
        }
    }

    /// Date range requested from the service for this period.
    ///
    /// * week: the 7 days before today,
    /// * month: the 30 days before today,
    /// * quarter: the first day of the month three months back,
    /// * year: January 1st,
    /// * all: January 1st two years back,
    ///
    /// all ending today.
    #[must_use]
    pub fn query_range(self, today: NaiveDate) -> DateRange {
        let start = match self {
            Self::Week => days_before(today, 7),
            Self::Month => days_before(today, 30),
            Self::Quarter => months_before(first_of_month(today), 3),
            Self::Year => first_of_year(today),
            Self::All => NaiveDate::from_ymd_opt(today.year() - 2, 1, 1).unwrap_or(today),
        };
        DateRange::new(start, today)
    }

    /// Date range covered by the chart buckets.
    ///
    /// Starts at the first bucket and ends today. For `Year` the buckets
    /// after the current month exist but stay empty.
    #[must_use]
    pub fn chart_window(self, today: NaiveDate) -> DateRange {
        let start = match self {
            Self::Week => days_before(today, 6),
            Self::Month => days_before(today, 29),
            Self::Quarter => months_before(first_of_month(today), 2),
            Self::Year => first_of_year(today),
            Self::All => months_before(first_of_month(today), 23),
        };
        DateRange::new(start, today)
    }
}

impl fmt::Display for Period {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ParseEnumError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "semana" => Ok(Self::Week),
            "month" | "mes" | "mês" => Ok(Self::Month),
            "quarter" | "trimestre" => Ok(Self::Quarter),
            "year" | "ano" => Ok(Self::Year),
            "all" | "tudo" => Ok(Self::All),
            _ => Err(ParseEnumError::new("period", s)),
        }
    }
}

/// `date` minus `days`, saturating at the earliest representable date.
pub(crate) fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

/// `date` minus `months`, saturating at the earliest representable date.
pub(crate) fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// First day of `date`'s month.
pub(crate) fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// January 1st of `date`'s year.
fn first_of_year(date: NaiveDate) -> NaiveDate {
    date.with_ordinal(1).unwrap_or(date)
}
