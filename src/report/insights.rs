//! Human-readable observations derived from a report.

use chrono::NaiveDate;
use serde::Serialize;

use super::{CategoryAggregate, whole_percent};
use crate::format::{format_currency, format_percent};
use crate::models::{MonthComparison, Transaction, TrendDirection};

/// Upper bound of the expense/income ratio progress bar, in percent.
const RATIO_SCALE_MAX: f64 = 150.0;

/// Tone of an insight; maps to the card colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Good news (green).
    Positive,
    /// Getting close to a limit (amber).
    Warning,
    /// Bad news (red).
    Negative,
    /// Informational (brand purple).
    Neutral,
}

impl Severity {
    /// Hex colour of the card.
    #[inline]
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Positive => "#4CAF50",
            Self::Warning => "#FFC107",
            Self::Negative => "#FF5252",
            Self::Neutral => "#A239FF",
        }
    }
}

/// One insight card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    /// Stable tag (`top-category`, `expense-income-ratio`, ...).
    pub id: &'static str,
    /// Card title.
    pub title: String,
    /// Card body.
    pub description: String,
    /// Icon identifier.
    pub icon: &'static str,
    /// Card tone.
    pub severity: Severity,
    /// Value driving the progress bar.
    pub value: f64,
    /// Value at which the progress bar is full.
    pub max_value: f64,
}

impl Insight {
    /// Progress bar fill, `0..=100`. Never NaN.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.max_value > 0.0 && self.value.is_finite() && self.max_value.is_finite() {
            (self.value / self.max_value * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

/// Totals of the period an insight set is computed for.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// Sum of expenses.
    pub total_expense: f64,
    /// Sum of income and salary.
    pub total_income: f64,
    /// Month-over-month comparison reported by the service, if any.
    pub comparison: Option<MonthComparison>,
}

impl PeriodSummary {
    /// Computes the totals of `transactions`.
    #[must_use]
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let (total_expense, total_income) =
            transactions
                .iter()
                .fold((0.0_f64, 0.0_f64), |(expense, income), tx| {
                    if tx.kind.is_expense() {
                        (expense + tx.amount, income)
                    } else {
                        (expense, income + tx.amount)
                    }
                });
        Self {
            total_expense,
            total_income,
            comparison: None,
        }
    }

    /// Attaches the service's month-over-month comparison.
    #[inline]
    #[must_use]
    pub fn with_comparison(mut self, comparison: Option<MonthComparison>) -> Self {
        self.comparison = comparison;
        self
    }

    /// Income minus expense.
    #[inline]
    #[must_use]
    pub fn net(&self) -> f64 {
        self.total_income - self.total_expense
    }
}

/// Derives the insight cards for a report.
///
/// Cards whose preconditions are not met are left out:
///
/// * `top-category` needs at least one category aggregate,
/// * `expense-income-ratio` needs income above zero,
/// * `daily-average` needs at least one expense,
/// * `spending-trend` needs a month-over-month comparison.
///
/// `net-balance` is always present. The function is pure.
#[must_use]
pub fn generate_insights(
    transactions: &[Transaction],
    aggregates: &[CategoryAggregate],
    summary: &PeriodSummary,
) -> Vec<Insight> {
    let mut insights = Vec::with_capacity(5);
    insights.extend(top_category(aggregates));
    insights.extend(expense_income_ratio(summary));
    insights.extend(daily_average(transactions, summary.total_expense));
    insights.push(net_balance(summary));
    insights.extend(summary.comparison.as_ref().map(spending_trend));
    insights
}

/// Largest expense category.
fn top_category(aggregates: &[CategoryAggregate]) -> Option<Insight> {
    let top = aggregates.first()?;
    Some(Insight {
        id: "top-category",
        title: "Maior categoria de gasto".to_owned(),
        description: format!(
            "{} representa {} do seu gasto total",
            top.display_name,
            format_percent(f64::from(top.percent_of_total))
        ),
        icon: top.icon,
        severity: Severity::Negative,
        value: f64::from(top.percent_of_total),
        max_value: 100.0,
    })
}

/// How much of the income the expenses consume.
fn expense_income_ratio(summary: &PeriodSummary) -> Option<Insight> {
    if summary.total_income <= 0.0 {
        return None;
    }
    let ratio = f64::from(whole_percent(
        summary.total_expense / summary.total_income * 100.0,
    ));
    let severity = if ratio < 80.0 {
        Severity::Positive
    } else if ratio < 100.0 {
        Severity::Warning
    } else {
        Severity::Negative
    };
    Some(Insight {
        id: "expense-income-ratio",
        title: "Despesas vs. Receitas".to_owned(),
        description: format!("Você gasta {} do que ganha", format_percent(ratio)),
        icon: "trending-up-outline",
        severity,
        value: ratio,
        max_value: RATIO_SCALE_MAX,
    })
}

/// Expense per day between the first and last expense.
fn daily_average(transactions: &[Transaction], total_expense: f64) -> Option<Insight> {
    let mut expenses = transactions.iter().filter(|tx| tx.kind.is_expense()).peekable();
    if expenses.peek().is_none() {
        return None;
    }

    let (earliest, latest) = expenses.filter_map(Transaction::parsed_date).fold(
        (None::<NaiveDate>, None::<NaiveDate>),
        |(lo, hi), date| {
            (
                Some(lo.map_or(date, |lo_date| lo_date.min(date))),
                Some(hi.map_or(date, |hi_date| hi_date.max(date))),
            )
        },
    );
    let span_days = earliest
        .zip(latest)
        .map_or(0, |(first, last)| (last - first).num_days());
    let days = span_days.max(1);

    #[allow(
        clippy::cast_precision_loss,
        reason = "day spans are far below 2^52"
    )]
    let average = total_expense / days as f64;

    Some(Insight {
        id: "daily-average",
        title: "Média diária de gastos".to_owned(),
        description: format!("Gasto médio de {} por dia", format_currency(average, true)),
        icon: "calendar-outline",
        severity: Severity::Neutral,
        value: average,
        max_value: average * 2.0,
    })
}

/// Savings or deficit over the period.
fn net_balance(summary: &PeriodSummary) -> Insight {
    let net = summary.net();
    let magnitude = net.abs();
    let amount = format_currency(magnitude, true);
    let (title, description, icon, severity) = if net >= 0.0 {
        (
            "Economia no período",
            format!("Você economizou {amount} no período"),
            "wallet-outline",
            Severity::Positive,
        )
    } else {
        (
            "Déficit no período",
            format!("Você gastou {amount} a mais do que ganhou"),
            "alert-circle-outline",
            Severity::Negative,
        )
    };
    Insight {
        id: "net-balance",
        title: title.to_owned(),
        description,
        icon,
        severity,
        value: magnitude,
        max_value: summary.total_income.max(magnitude),
    }
}

/// Spending compared with the previous month.
fn spending_trend(comparison: &MonthComparison) -> Insight {
    let percent = format_percent(comparison.variation_percent);
    let (word, icon, severity) = match comparison.direction {
        TrendDirection::Increase => ("Aumento", "trending-up-outline", Severity::Negative),
        TrendDirection::Decrease => ("Redução", "trending-down-outline", Severity::Positive),
    };
    Insight {
        id: "spending-trend",
        title: "Tendência de gastos".to_owned(),
        description: format!("{word} de {percent} em relação ao mês anterior"),
        icon,
        severity,
        value: comparison.variation_percent,
        max_value: 100.0,
    }
}
