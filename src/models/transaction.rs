//! Transaction model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CategoryRef, TransactionId, TransactionKind, lenient};
use crate::format;

/// One recorded expense, income or salary event.
///
/// `amount` is always the absolute magnitude; the direction comes from
/// `kind` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Service-assigned or local identifier.
    pub id: TransactionId,
    /// Expense, income or salary.
    #[serde(rename = "tipo")]
    pub kind: TransactionKind,
    /// Amount in BRL (>= 0).
    #[serde(rename = "valor", default, deserialize_with = "lenient::amount")]
    pub amount: f64,
    /// Raw category reference.
    #[serde(rename = "categoria", default)]
    pub category: CategoryRef,
    /// Optional free-text description.
    #[serde(
        rename = "descricao",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// Date as received (usually `YYYY-MM-DD` or an ISO timestamp).
    #[serde(rename = "data", alias = "data_recebimento", default)]
    pub date: String,
    /// Whether the transaction repeats. Informational only.
    #[serde(rename = "recorrente", default)]
    pub recurring: bool,
}

impl Transaction {
    /// Creates a transaction dated `date`.
    ///
    /// Negative or non-finite amounts are normalised to their magnitude
    /// (or zero).
    #[must_use]
    pub fn new<I, C>(id: I, kind: TransactionKind, amount: f64, category: C, date: NaiveDate) -> Self
    where
        I: Into<TransactionId>,
        C: Into<CategoryRef>,
    {
        Self {
            id: id.into(),
            kind,
            amount: if amount.is_finite() { amount.abs() } else { 0.0 },
            category: category.into(),
            description: None,
            date: format::format_date_for_api(date),
            recurring: false,
        }
    }

    /// Sets the description.
    #[inline]
    #[must_use]
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the transaction as recurring.
    #[inline]
    #[must_use]
    pub const fn recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }

    /// Parses the raw date. `None` when it is not a recognizable date.
    #[inline]
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        format::parse_date(&self.date)
    }

    /// Returns the description, or an empty string when absent.
    #[inline]
    #[must_use]
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}
