//! Financial summary and transaction list responses.

use serde::{Deserialize, Serialize};

use super::{Transaction, lenient};

/// Direction of spending compared with the previous month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendDirection {
    /// Spending went up (`aumento`).
    #[serde(rename = "aumento")]
    Increase,
    /// Spending went down. Any other wire value is read as a decrease.
    #[serde(rename = "reducao", other)]
    Decrease,
}

/// Comparison of the current month's spending with the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthComparison {
    /// Percentage change (magnitude).
    #[serde(rename = "percentual_variacao", default, deserialize_with = "lenient::amount")]
    pub variation_percent: f64,
    /// Whether spending rose or fell.
    #[serde(rename = "direcao")]
    pub direction: TrendDirection,
}

/// Totals returned by `GET /transacoes/resumo/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// Whether the service considers the request successful.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Sum of all expenses.
    #[serde(
        rename = "totalDespesas",
        alias = "total_despesas",
        default,
        deserialize_with = "lenient::number"
    )]
    pub total_expense: f64,
    /// Sum of all income (including salary).
    #[serde(
        rename = "totalGanhos",
        alias = "total_ganhos",
        default,
        deserialize_with = "lenient::number"
    )]
    pub total_income: f64,
    /// Income minus expense. May be negative.
    #[serde(rename = "saldo", default, deserialize_with = "lenient::number")]
    pub balance: f64,
    /// Optional month-over-month comparison.
    #[serde(
        rename = "comparativo_mes_anterior",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub comparison: Option<MonthComparison>,
    /// Error message when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FinancialSummary {
    /// Builds a successful summary from totals. The balance is derived.
    #[must_use]
    pub fn from_totals(total_expense: f64, total_income: f64) -> Self {
        Self {
            success: true,
            total_expense,
            total_income,
            balance: total_income - total_expense,
            comparison: None,
            message: None,
        }
    }

    /// Attaches a month-over-month comparison.
    #[inline]
    #[must_use]
    pub const fn with_comparison(mut self, comparison: MonthComparison) -> Self {
        self.comparison = Some(comparison);
        self
    }
}

/// Response of `GET /transacoes/listar/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionList {
    /// Whether the service considers the request successful.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Transactions, newest first as sent by the service.
    #[serde(rename = "transacoes", default)]
    pub transactions: Vec<Transaction>,
    /// Error message when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Missing `success` flags mean the service did not report a failure.
const fn default_success() -> bool {
    true
}
