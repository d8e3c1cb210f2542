//! The service's own period report (`GET /transacoes/relatorio/`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Transaction, lenient};

/// Window the service reported on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    /// Interval name (`semanal`, `mensal`, `anual`), when one was asked for.
    #[serde(rename = "tipo", default)]
    pub interval: Option<String>,
    /// First day, `YYYY-MM-DD`.
    #[serde(rename = "data_inicio", default)]
    pub start: Option<String>,
    /// Last day, `YYYY-MM-DD`.
    #[serde(rename = "data_fim", default)]
    pub end: Option<String>,
}

/// Totals and transactions of one period, computed by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    /// Window covered.
    #[serde(rename = "periodo", default)]
    pub window: ReportWindow,
    /// Transactions in the window.
    #[serde(rename = "transacoes", default)]
    pub transactions: Vec<Transaction>,
    /// Sum of expenses.
    #[serde(rename = "total_despesas", default, deserialize_with = "lenient::number")]
    pub total_expense: f64,
    /// Sum of income, salary included.
    #[serde(rename = "total_ganhos", default, deserialize_with = "lenient::number")]
    pub total_income: f64,
    /// Income minus expense over the window.
    #[serde(rename = "saldo_periodo", default, deserialize_with = "lenient::number")]
    pub balance: f64,
    /// Expense total per category name.
    #[serde(rename = "categorias", default, deserialize_with = "lenient::number_map")]
    pub by_category: HashMap<String, f64>,
    /// Category with the largest expense total, if the service named one.
    #[serde(
        rename = "categoria_mais_gasta",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub top_category: Option<String>,
}

impl PeriodReport {
    /// Per-category totals, largest first. Ties keep name order.
    #[must_use]
    pub fn categories_by_total(&self) -> Vec<(&str, f64)> {
        let mut totals: Vec<(&str, f64)> = self
            .by_category
            .iter()
            .map(|(name, &total)| (name.as_str(), total))
            .collect();
        totals.sort_by(|left, right| right.1.total_cmp(&left.1).then_with(|| left.0.cmp(right.0)));
        totals
    }
}

/// Response envelope of `GET /transacoes/relatorio/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PeriodReportResponse {
    /// Whether the service considers the request successful.
    #[serde(default)]
    pub success: bool,
    /// Error message when `success` is false.
    #[serde(default)]
    pub message: Option<String>,
    /// The report. Missing when the window held nothing.
    #[serde(rename = "relatorio", default)]
    pub report: Option<PeriodReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_envelope() {
        let json = r#"{
            "success": true,
            "relatorio": {
                "periodo": {"tipo": "mensal", "data_inicio": "2024-05-01", "data_fim": "2024-05-31"},
                "transacoes": [
                    {"id": "1", "tipo": "despesa", "valor": 900, "categoria": "Moradia", "data": "2024-05-05"}
                ],
                "total_despesas": "900,00",
                "total_ganhos": 3000,
                "saldo_periodo": 2100,
                "categorias": {"Moradia": 900, "Lazer": 45.5}
            }
        }"#;
        let response: PeriodReportResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        let report = response.report.unwrap();
        assert_eq!(report.window.interval.as_deref(), Some("mensal"));
        assert_eq!(report.transactions.len(), 1);
        assert!((report.total_expense - 900.0).abs() < f64::EPSILON);
        assert!((report.balance - 2100.0).abs() < f64::EPSILON);
        assert_eq!(
            report.categories_by_total(),
            vec![("Moradia", 900.0), ("Lazer", 45.5)]
        );
    }

    #[test]
    fn empty_report_defaults() {
        let response: PeriodReportResponse =
            serde_json::from_str(r#"{"success": true, "relatorio": {}}"#).unwrap();
        let report = response.report.unwrap();
        assert!(report.transactions.is_empty());
        assert!(report.by_category.is_empty());
        assert!(report.window.start.is_none());
    }
}
