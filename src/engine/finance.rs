use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::{records::entities::FinanceRecord, utils::percentage::round_to};

/// Expense categories counted as discretionary by [risk_score].
pub const RISKY_CATEGORIES: [&str; 3] = ["entertainment", "shopping", "other"];

/// Average expense amount that alone pushes the amount part of the risk to its maximum.
const RISK_AMOUNT_NORMALIZER: f64 = 100.;
const RISK_CATEGORY_WEIGHT: f64 = 0.7;
const RISK_AMOUNT_WEIGHT: f64 = 0.3;

/// Spending on the top category above which it's considered a large spend.
const LARGE_CATEGORY_AMOUNT: f64 = 300.;
/// Number of expenses above which spending is considered frequent.
const FREQUENT_EXPENSE_COUNT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinanceSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_balance: f64,
    pub expense_by_category: BTreeMap<String, f64>,
    /// Expense divided by the number of distinct days with records.
    pub avg_daily_expense: f64,
}

pub fn total_income(records: &[FinanceRecord]) -> f64 {
    records.iter().filter(|v| v.is_income()).map(|v| v.amount).sum()
}

pub fn total_expense(records: &[FinanceRecord]) -> f64 {
    records.iter().filter(|v| v.is_expense()).map(|v| v.amount).sum()
}

pub fn summarize_finance(records: &[FinanceRecord]) -> FinanceSummary {
    let total_income = total_income(records);
    let total_expense = total_expense(records);

    let days = records
        .iter()
        .filter_map(|v| v.date)
        .collect::<BTreeSet<_>>()
        .len();

    FinanceSummary {
        total_income,
        total_expense,
        net_balance: total_income - total_expense,
        expense_by_category: expense_by_category(records),
        avg_daily_expense: if days > 0 {
            total_expense / days as f64
        } else {
            0.
        },
    }
}

/// Expense amounts grouped by category. Expenses without a category are left out.
pub fn expense_by_category(records: &[FinanceRecord]) -> BTreeMap<String, f64> {
    let mut categories = BTreeMap::<String, f64>::new();
    for record in records
        .iter()
        .filter(|v| v.is_expense() && !v.category.trim().is_empty())
    {
        *categories.entry(record.category.clone()).or_default() += record.amount;
    }
    categories
}

fn is_risky(category: &str) -> bool {
    let category = category.trim().to_lowercase();
    RISKY_CATEGORIES.contains(&category.as_str())
}

/// Spending risk on a `[0, 1]` scale, rounded to two decimals. Combines the share of
/// discretionary spending with the average expense size.
pub fn risk_score(records: &[FinanceRecord]) -> f64 {
    let expenses = records.iter().filter(|v| v.is_expense()).collect::<Vec<_>>();
    let total = expenses.iter().map(|v| v.amount).sum::<f64>();
    if expenses.is_empty() || total <= 0. {
        return 0.;
    }

    let risky = expenses
        .iter()
        .filter(|v| is_risky(&v.category))
        .map(|v| v.amount)
        .sum::<f64>();
    let risky_fraction = risky / total;
    let avg_amount = total / expenses.len() as f64;

    let score = f64::min(
        1.,
        risky_fraction * RISK_CATEGORY_WEIGHT
            + avg_amount / RISK_AMOUNT_NORMALIZER * RISK_AMOUNT_WEIGHT,
    );
    round_to(score, 2)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpendingPattern {
    pub expense_count: usize,
    /// Category with the largest spend and its amount.
    pub top_category: Option<(String, f64)>,
    pub frequent: bool,
    pub large_top_category: bool,
}

pub fn spending_pattern(records: &[FinanceRecord]) -> SpendingPattern {
    let expense_count = records.iter().filter(|v| v.is_expense()).count();
    // BTreeMap iteration keeps ties on the alphabetically first category
    let top_category = expense_by_category(records)
        .into_iter()
        .fold(None, |top: Option<(String, f64)>, (category, amount)| match top {
            Some((_, best)) if best >= amount => top,
            _ => Some((category, amount)),
        });

    SpendingPattern {
        expense_count,
        large_top_category: top_category
            .as_ref()
            .is_some_and(|(_, amount)| *amount > LARGE_CATEGORY_AMOUNT),
        top_category,
        frequent: expense_count > FREQUENT_EXPENSE_COUNT,
    }
}
