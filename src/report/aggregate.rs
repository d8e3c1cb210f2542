//! Per-category expense rollups.

use std::collections::HashMap;

use serde::Serialize;

use super::whole_percent;
use crate::category::{CategoryContext, CategoryTables};
use crate::models::{CategoryRef, Transaction};

/// Expense total for one raw category reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAggregate {
    /// Raw grouping key as stored on the transactions.
    pub category: CategoryRef,
    /// Resolved display name.
    pub display_name: String,
    /// Icon identifier.
    pub icon: &'static str,
    /// Hex colour.
    pub color: &'static str,
    /// Sum of amounts.
    pub total: f64,
    /// Number of transactions.
    pub count: usize,
    /// Share of all expenses in this set, rounded to a whole percent.
    pub percent_of_total: u32,
}

/// Groups expenses by raw category using the built-in category tables.
///
/// See [`aggregate_by_category_with`].
#[must_use]
pub fn aggregate_by_category(transactions: &[Transaction]) -> Vec<CategoryAggregate> {
    aggregate_by_category_with(transactions, &CategoryTables::default())
}

/// Groups expenses by raw category.
///
/// Income and salary are ignored. References that differ on the wire stay
/// separate even when they resolve to the same name. The result is sorted
/// by total, largest first; ties keep the order in which the categories
/// first appeared. Returns an empty vector when there are no expenses.
#[must_use]
pub fn aggregate_by_category_with(
    transactions: &[Transaction],
    tables: &CategoryTables,
) -> Vec<CategoryAggregate> {
    let mut order: Vec<(&CategoryRef, f64, usize)> = Vec::new();
    let mut positions: HashMap<&CategoryRef, usize> = HashMap::new();

    for tx in transactions.iter().filter(|tx| tx.kind.is_expense()) {
        let position = *positions.entry(&tx.category).or_insert_with(|| {
            order.push((&tx.category, 0.0, 0));
            order.len() - 1
        });
        if let Some(group) = order.get_mut(position) {
            group.1 += tx.amount;
            group.2 += 1;
        }
    }

    let grand_total: f64 = order.iter().map(|&(_, total, _)| total).sum();
    let mut aggregates: Vec<CategoryAggregate> = order
        .into_iter()
        .map(|(category, total, count)| {
            let style = tables.resolve(CategoryContext::Expense, category);
            let percent_of_total = if grand_total > 0.0 {
                whole_percent(total / grand_total * 100.0)
            } else {
                0
            };
            CategoryAggregate {
                category: category.clone(),
                display_name: style.display_name,
                icon: style.icon,
                color: style.color,
                total,
                count,
                percent_of_total,
            }
        })
        .collect();

    aggregates.sort_by(|a, b| b.total.total_cmp(&a.total));
    aggregates
}
