//! Enumeration types for constrained API values.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what}: {value:?}")]
pub struct ParseEnumError {
    /// Human-readable name of the enum being parsed.
    what: &'static str,
    /// The rejected input.
    value: String,
}

impl ParseEnumError {
    /// Creates a new parse error for the given enum and input.
    #[inline]
    #[must_use]
    pub fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_owned(),
        }
    }
}

/// Direction of a transaction. The sign of the amount is implied by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money spent (`despesa`).
    #[serde(rename = "despesa", alias = "expense")]
    Expense,
    /// Money received (`ganho`).
    #[serde(rename = "ganho", alias = "income")]
    Income,
    /// Salary payment (`salario`). Aggregates as income.
    #[serde(rename = "salario", alias = "salary")]
    Salary,
}

impl TransactionKind {
    /// All variants, in display order.
    pub const ALL: [Self; 3] = [Self::Expense, Self::Income, Self::Salary];

    /// Returns the wire name used by the API (`despesa`, `ganho`,
    /// `salario`). It doubles as the endpoint path segment.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "despesa",
            Self::Income => "ganho",
            Self::Salary => "salario",
        }
    }

    /// Returns `true` for kinds counted on the income side of a report.
    #[inline]
    #[must_use]
    pub const fn is_income(self) -> bool {
        matches!(self, Self::Income | Self::Salary)
    }

    /// Returns `true` for expenses.
    #[inline]
    #[must_use]
    pub const fn is_expense(self) -> bool {
        matches!(self, Self::Expense)
    }
}

impl fmt::Display for TransactionKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ParseEnumError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "despesa" | "expense" => Ok(Self::Expense),
            "ganho" | "income" | "receita" => Ok(Self::Income),
            "salario" | "salário" | "salary" => Ok(Self::Salary),
            _ => Err(ParseEnumError::new("transaction kind", s)),
        }
    }
}

/// Interval accepted by the service's period report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportInterval {
    /// Current week (`semanal`).
    #[serde(rename = "semanal")]
    Weekly,
    /// Current month (`mensal`).
    #[serde(rename = "mensal")]
    Monthly,
    /// Current year (`anual`).
    #[serde(rename = "anual")]
    Yearly,
}

impl ReportInterval {
    /// Returns the query value (`semanal`, `mensal`, `anual`).
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "semanal",
            Self::Monthly => "mensal",
            Self::Yearly => "anual",
        }
    }
}

impl fmt::Display for ReportInterval {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportInterval {
    type Err = ParseEnumError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "semanal" | "week" | "weekly" => Ok(Self::Weekly),
            "mensal" | "month" | "monthly" => Ok(Self::Monthly),
            "anual" | "year" | "yearly" => Ok(Self::Yearly),
            _ => Err(ParseEnumError::new("report interval", s)),
        }
    }
}
