//! Example dataset shown when the service cannot be reached.

use crate::clock::Clock;
use crate::models::{FinancialSummary, Transaction, TransactionKind};

use super::period::days_before;

/// (days ago, kind, amount, category, description)
const SAMPLE_ROWS: [(u64, TransactionKind, f64, &str, &str); 12] = [
    (2, TransactionKind::Expense, 450.90, "Alimentação", "Supermercado"),
    (5, TransactionKind::Expense, 120.00, "Alimentação", "Restaurante"),
    (7, TransactionKind::Expense, 180.00, "Transporte", "Combustível"),
    (10, TransactionKind::Expense, 250.00, "Lazer", "Cinema e jantar"),
    (15, TransactionKind::Expense, 1500.00, "Moradia", "Aluguel"),
    (18, TransactionKind::Expense, 320.00, "Saúde", "Consulta médica"),
    (22, TransactionKind::Expense, 450.00, "Educação", "Curso online"),
    (25, TransactionKind::Expense, 380.50, "Alimentação", "Supermercado"),
    (27, TransactionKind::Expense, 150.00, "Transporte", "Combustível"),
    (1, TransactionKind::Income, 4500.00, "Salário", "Salário mensal"),
    (12, TransactionKind::Income, 1200.00, "Freelance", "Projeto website"),
    (20, TransactionKind::Income, 350.00, "Investimentos", "Dividendos"),
];

/// Example transactions dated relative to `clock`'s today.
#[must_use]
pub fn example_transactions(clock: &dyn Clock) -> Vec<Transaction> {
    let today = clock.today();
    SAMPLE_ROWS
        .iter()
        .zip(1_u32..)
        .map(|(&(days_ago, kind, amount, category, description), id)| {
            Transaction::new(
                id.to_string(),
                kind,
                amount,
                category,
                days_before(today, days_ago),
            )
            .with_description(description)
        })
        .collect()
}

/// Example account totals.
#[must_use]
pub fn example_summary() -> FinancialSummary {
    FinancialSummary::from_totals(3000.0, 5000.0)
}
