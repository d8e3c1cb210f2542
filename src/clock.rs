//! Injectable source of "today".
//!
//! Everything that depends on the current date (report windows, the
//! wizard's default date, the example dataset) takes a [`Clock`] so that
//! results are reproducible in tests.

use chrono::{Local, NaiveDate};

/// Provides the current calendar date.
pub trait Clock: Send + Sync + core::fmt::Debug {
    /// Returns today's date.
    fn today(&self) -> NaiveDate;
}

/// Reads the date from the system clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(NaiveDate);

impl FixedClock {
    /// Creates a clock frozen at `today`.
    #[inline]
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self(today)
    }
}

impl Clock for FixedClock {
    #[inline]
    fn today(&self) -> NaiveDate {
        self.0
    }
}
